//! Performance recording and session-level aggregates.
//!
//! One record per completed step, appended when the UI confirms the
//! step and never mutated afterwards. Re-confirming a step whose record
//! already exists returns the existing record instead of duplicating
//! it. All aggregates are pure reductions over the record list.

use crate::cursor::StepKey;
use crate::library::ExerciseLibrary;
use crate::types::MuscleCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the athlete reports for a completed step
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ObservedValues {
    pub actual_reps: Option<u32>,
    pub actual_weight_kg: Option<f64>,
    pub actual_duration_seconds: Option<u32>,
    /// Rate of perceived exertion, 1-10
    pub rpe: Option<u8>,
    /// Seconds spent in each cluster mini-set
    pub cluster_timings: Option<Vec<f64>>,
    pub cluster_reps: Option<Vec<u32>>,
    pub rest_pause_reps: Option<Vec<u32>>,
}

/// Immutable record of one completed step
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub key: StepKey,
    /// Exercise this step belonged to, for breakdown reporting
    pub exercise_id: Option<String>,
    #[serde(flatten)]
    pub observed: ObservedValues,
    pub completed_at: DateTime<Utc>,
}

/// Per-exercise summary for the breakdown report
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub set_count: usize,
    pub total_reps: u32,
    pub tonnage_kg: f64,
}

/// Append-only log of performance records for one session
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PerformanceLog {
    records: Vec<PerformanceRecord>,
}

impl PerformanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[PerformanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Existing record for a step key. Last match wins; the key is
    /// expected unique per session anyway.
    pub fn find(&self, key: StepKey) -> Option<&PerformanceRecord> {
        self.records.iter().rev().find(|r| r.key == key)
    }

    /// Append a record for a completed step. Idempotent per key: if the
    /// step was already confirmed, the existing record is returned and
    /// nothing is written.
    pub fn record_completion(
        &mut self,
        key: StepKey,
        exercise_id: Option<String>,
        observed: ObservedValues,
        completed_at: DateTime<Utc>,
    ) -> &PerformanceRecord {
        if let Some(index) = self.records.iter().rposition(|r| r.key == key) {
            tracing::debug!(?key, "step already recorded, returning existing record");
            return &self.records[index];
        }
        self.records.push(PerformanceRecord {
            key,
            exercise_id,
            observed,
            completed_at,
        });
        &self.records[self.records.len() - 1]
    }

    /// Total weight moved: `Σ reps × weight` over records with both known
    pub fn total_tonnage_kg(&self) -> f64 {
        self.records
            .iter()
            .filter_map(|r| {
                let reps = r.observed.actual_reps?;
                let weight = r.observed.actual_weight_kg?;
                Some(reps as f64 * weight)
            })
            .sum()
    }

    /// Mean of all reported RPE values, `None` when nothing was reported
    pub fn average_rpe(&self) -> Option<f64> {
        let rpes: Vec<u8> = self.records.iter().filter_map(|r| r.observed.rpe).collect();
        if rpes.is_empty() {
            return None;
        }
        Some(rpes.iter().map(|r| *r as f64).sum::<f64>() / rpes.len() as f64)
    }

    /// Recorded steps over planned steps, clamped to [0, 1]
    pub fn completion_ratio(&self, planned_steps: usize) -> f64 {
        if planned_steps == 0 {
            return 0.0;
        }
        (self.records.len() as f64 / planned_steps as f64).min(1.0)
    }

    /// Aggregate records by exercise display name. Records without an
    /// exercise (rest blocks and the like) are skipped.
    pub fn by_exercise(&self, library: &dyn ExerciseLibrary) -> BTreeMap<String, ExerciseSummary> {
        let mut breakdown: BTreeMap<String, ExerciseSummary> = BTreeMap::new();
        for record in &self.records {
            let Some(exercise_id) = &record.exercise_id else {
                continue;
            };
            let entry = breakdown.entry(library.display_name(exercise_id)).or_default();
            accumulate(entry, &record.observed);
        }
        breakdown
    }

    /// Aggregate records by the exercise's primary muscle category.
    /// Records whose exercise the library does not know are skipped.
    pub fn by_muscle(
        &self,
        library: &dyn ExerciseLibrary,
    ) -> BTreeMap<MuscleCategory, ExerciseSummary> {
        let mut breakdown: BTreeMap<MuscleCategory, ExerciseSummary> = BTreeMap::new();
        for record in &self.records {
            let Some(info) = record
                .exercise_id
                .as_deref()
                .and_then(|id| library.lookup(id))
            else {
                continue;
            };
            let entry = breakdown.entry(info.primary_muscle).or_default();
            accumulate(entry, &record.observed);
        }
        breakdown
    }
}

fn accumulate(entry: &mut ExerciseSummary, observed: &ObservedValues) {
    entry.set_count += 1;
    if let Some(reps) = observed.actual_reps {
        entry.total_reps += reps;
        if let Some(weight) = observed.actual_weight_kg {
            entry.tonnage_kg += reps as f64 * weight;
        }
    }
}

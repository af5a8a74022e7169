//! Workout session facade.
//!
//! `WorkoutSession` is what the UI talks to: it asks for the current
//! step, renders it, and confirms completion or steps back. The session
//! owns the cursor, the phase timer and the performance log, and calls
//! the external collaborators (exercise library, one-rep-max provider,
//! notification sink) through their narrow traits.
//!
//! Single-writer model: all mutation goes through one logical task. The
//! plan is read-only for the session's lifetime; edit the card, rebuild
//! the session.

use crate::config::Config;
use crate::cursor::{total_steps, SessionCursor, StepKey};
use crate::library::{ExerciseLibrary, OneRepMaxProvider};
use crate::loads::{self, resolve_weight};
use crate::notify::{self, NotificationKind, NotificationSink, TIMER_NOTIFICATION_ID};
use crate::recorder::{ExerciseSummary, ObservedValues, PerformanceLog, PerformanceRecord};
use crate::timer::{PhaseTimer, RunState, TimerMode, TimerSnapshot};
use crate::types::{Block, BlockKind, Card, ExerciseItem, MethodKind, MuscleCategory, SetTarget, WorkSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Everything the UI needs to render the current step
#[derive(Clone, Debug, PartialEq)]
pub struct StepInfo {
    pub key: StepKey,
    /// Display label: exercise name, method name or "Pausa"
    pub title: String,
    pub exercise_id: Option<String>,
    pub target: Option<SetTarget>,
    /// Resolved load, absent when it cannot be displayed
    pub weight_kg: Option<f64>,
    /// 1-based set (or round) number and its total
    pub set_number: usize,
    pub set_count: usize,
    /// Rest that follows this step
    pub rest_seconds: u32,
    pub cluster_curve: Option<Vec<f64>>,
    pub cluster_description: Option<String>,
    pub rest_pause_description: Option<String>,
}

/// Persisted result of a finished or abandoned session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub card_id: String,
    pub started_at: DateTime<Utc>,
    pub active_seconds: i64,
    pub total_tonnage_kg: f64,
    pub average_rpe: Option<f64>,
    pub completion_ratio: f64,
    pub by_exercise: BTreeMap<String, ExerciseSummary>,
    pub by_muscle: BTreeMap<MuscleCategory, ExerciseSummary>,
}

/// One workout session in flight
pub struct WorkoutSession {
    id: Uuid,
    card: Card,
    config: Config,
    cursor: SessionCursor,
    timer: PhaseTimer,
    log: PerformanceLog,
    library: Box<dyn ExerciseLibrary>,
    maxes: Box<dyn OneRepMaxProvider>,
    notifications: Box<dyn NotificationSink>,
}

impl WorkoutSession {
    pub fn new(
        card: Card,
        config: Config,
        library: Box<dyn ExerciseLibrary>,
        maxes: Box<dyn OneRepMaxProvider>,
        notifications: Box<dyn NotificationSink>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            cursor: SessionCursor::new(started_at),
            timer: PhaseTimer::new(TimerMode::Countdown {
                seconds: config.defaults.rest_seconds,
            }),
            log: PerformanceLog::new(),
            card,
            config,
            library,
            maxes,
            notifications,
        };
        // Prime the timer for the first step without starting it
        if let Some(mode) = session.desired_timer_mode() {
            session.timer.update(mode);
        }
        tracing::info!(session = %session.id, card = %session.card.id, "session started");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn is_completed(&self) -> bool {
        self.cursor.is_completed()
    }

    pub fn records(&self) -> &[PerformanceRecord] {
        self.log.records()
    }

    pub fn timer_mode(&self) -> TimerMode {
        self.timer.mode()
    }

    /// Drive the timer from the host's periodic callback
    pub fn tick(&mut self, now: DateTime<Utc>) -> TimerSnapshot {
        self.timer.tick(now)
    }

    /// Active training time so far, clamped at zero
    pub fn elapsed(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.cursor.elapsed(now)
    }

    fn current_block(&self) -> Option<&Block> {
        self.card.blocks.get(self.cursor.block_index)
    }

    fn one_rep_max_for(&self, exercise: &ExerciseItem) -> Option<f64> {
        self.library
            .big_lift_for(&exercise.exercise_id)
            .and_then(|lift| self.maxes.one_rep_max(lift))
    }

    fn step_exercise<'a>(&self, block: &'a Block) -> Option<&'a ExerciseItem> {
        match block.kind {
            BlockKind::Simple => block.exercises.get(self.cursor.exercise_index),
            BlockKind::Method { .. } => block.exercises.get(self.cursor.method_exercise_index),
            BlockKind::CustomMethod { .. } => block.exercises.first(),
            BlockKind::Rest => None,
        }
    }

    fn step_set<'a>(&self, block: &Block, exercise: &'a ExerciseItem) -> Option<&'a WorkSet> {
        match block.kind {
            BlockKind::Simple => exercise.sets.get(self.cursor.set_index),
            // A method round uses its matching set when present
            BlockKind::Method { .. } => exercise
                .sets
                .get(self.cursor.set_index)
                .or_else(|| exercise.sets.first()),
            BlockKind::CustomMethod { .. } => exercise.sets.first(),
            BlockKind::Rest => None,
        }
    }

    /// Descriptive data for the current step, `None` once completed
    pub fn current_step(&self) -> Option<StepInfo> {
        let key = self.cursor.step_key(&self.card)?;
        let block = self.current_block()?;

        if block.is_rest() {
            return Some(StepInfo {
                key,
                title: "Pausa".to_string(),
                exercise_id: None,
                target: None,
                weight_kg: None,
                set_number: 1,
                set_count: 1,
                rest_seconds: block.global_rest_seconds,
                cluster_curve: None,
                cluster_description: None,
                rest_pause_description: None,
            });
        }

        let title = match &block.kind {
            BlockKind::CustomMethod { method_id } => self
                .card
                .custom_method(method_id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| "Metodo personalizzato".to_string()),
            _ => self
                .step_exercise(block)
                .map(|e| self.library.display_name(&e.exercise_id))
                .unwrap_or_else(|| crate::library::PLACEHOLDER_EXERCISE_NAME.to_string()),
        };

        let exercise = self.step_exercise(block);
        let set = exercise.and_then(|e| self.step_set(block, e));
        let one_rep_max = exercise.and_then(|e| self.one_rep_max_for(e));
        let weight_kg = set.and_then(|s| resolve_weight(&s.load, one_rep_max));

        let (set_number, set_count) = match block.kind {
            BlockKind::Method { .. } => (key.round, block.global_sets.max(1) as usize),
            _ => (
                key.set + 1,
                exercise.map(|e| e.sets.len()).unwrap_or(1).max(1),
            ),
        };

        let cluster = set.and_then(|s| s.cluster);
        let cluster_curve = set.and_then(|s| {
            let cluster = s.cluster?;
            let count = loads::cluster_count(s.reps(), Some(cluster.cluster_size))?;
            loads::cluster_load_curve(count, cluster.shape, cluster.min_pct, cluster.max_pct)
        });
        let cluster_description =
            set.and_then(|s| cluster.and_then(|c| loads::cluster_description(s.reps(), &c)));
        let rest_pause_description =
            set.and_then(|s| s.rest_pause.map(|rp| loads::rest_pause_description(&rp)));

        Some(StepInfo {
            key,
            title,
            exercise_id: exercise.map(|e| e.exercise_id.clone()),
            target: set.map(|s| s.target),
            weight_kg,
            set_number,
            set_count,
            rest_seconds: exercise
                .map(|e| e.effective_rest_seconds(block))
                .unwrap_or(block.global_rest_seconds),
            cluster_curve,
            cluster_description,
            rest_pause_description,
        })
    }

    /// Timer mode the current step calls for, `None` when completed
    fn desired_timer_mode(&self) -> Option<TimerMode> {
        if self.cursor.is_completed() {
            return None;
        }
        let block = self.current_block()?;
        let defaults = &self.config.defaults;

        let mode = match &block.kind {
            BlockKind::Rest => TimerMode::Countdown {
                seconds: block.global_rest_seconds.max(1),
            },
            BlockKind::Method { kind } if kind.is_interval_based() => {
                let intervals = block.intervals.unwrap_or(crate::types::IntervalParams {
                    work_seconds: defaults.tabata_work_seconds,
                    rest_seconds: defaults.tabata_rest_seconds,
                    rounds: defaults.tabata_rounds,
                    recovery_between_rounds_seconds: 0,
                });
                match kind {
                    MethodKind::Circuit => TimerMode::Circuit {
                        work_seconds: intervals.work_seconds,
                        rest_seconds: intervals.rest_seconds,
                        rounds: intervals.rounds,
                    },
                    _ => TimerMode::Tabata {
                        work_seconds: intervals.work_seconds,
                        rest_seconds: intervals.rest_seconds,
                        rounds: intervals.rounds,
                    },
                }
            }
            BlockKind::Method { kind: MethodKind::Emom } => TimerMode::Emom {
                interval_seconds: defaults.emom_interval_seconds,
                rounds: block.global_sets.max(1),
            },
            BlockKind::Method { kind: MethodKind::Amrap } => TimerMode::Amrap {
                total_seconds: defaults.amrap_seconds,
            },
            BlockKind::Simple | BlockKind::Method { .. } | BlockKind::CustomMethod { .. } => {
                let rest = self
                    .step_exercise(block)
                    .map(|e| e.effective_rest_seconds(block))
                    .unwrap_or(block.global_rest_seconds);
                let seconds = if rest > 0 { rest } else { defaults.rest_seconds };
                TimerMode::Countdown {
                    seconds: seconds.max(1),
                }
            }
        };
        Some(mode)
    }

    /// Reconfigure the timer for the position the cursor just reached.
    /// Starting a countdown-style phase schedules its notification.
    fn reconfigure_timer(&mut self, now: DateTime<Utc>, start: bool) {
        self.notifications.cancel(TIMER_NOTIFICATION_ID);
        match self.desired_timer_mode() {
            Some(mode) => {
                // Rest countdowns restart per step; an interval timer
                // keeps running across the steps of its block.
                let is_countdown = matches!(mode, TimerMode::Countdown { .. });
                if mode != self.timer.mode() || is_countdown {
                    self.timer.update(mode);
                }
                if start {
                    self.timer.start(now);
                    let snapshot = self.timer.snapshot(now);
                    let kind = NotificationKind::for_mode(&mode);
                    self.notifications
                        .schedule(notify::request_for(kind, snapshot.remaining_seconds));
                }
            }
            None => self.timer.stop(),
        }
    }

    /// Confirm the current step and move on. Returns the performance
    /// record for the step; confirming an already-recorded step returns
    /// the existing record and still advances.
    pub fn complete_current_step(
        &mut self,
        observed: ObservedValues,
        now: DateTime<Utc>,
    ) -> Option<PerformanceRecord> {
        let key = self.cursor.step_key(&self.card)?;
        let exercise_id = self
            .current_block()
            .and_then(|block| self.step_exercise(block))
            .map(|e| e.exercise_id.clone());

        let record = self
            .log
            .record_completion(key, exercise_id, observed, now)
            .clone();

        self.cursor.advance(&self.card);
        self.reconfigure_timer(now, true);
        Some(record)
    }

    /// Step back to the previous position. The existing performance
    /// record for that step, if any, is left untouched.
    pub fn previous_step(&mut self, now: DateTime<Utc>) {
        self.cursor.retreat(&self.card);
        self.reconfigure_timer(now, false);
    }

    /// Start an intra-set cluster pause countdown for the current set
    pub fn start_cluster_pause(&mut self, now: DateTime<Utc>) {
        let cluster = self.current_block().and_then(|block| {
            self.step_exercise(block)
                .and_then(|e| self.step_set(block, e))
                .and_then(|s| s.cluster)
        });
        let Some(cluster) = cluster else {
            return;
        };
        self.timer.update(TimerMode::Countdown {
            seconds: cluster.cluster_rest_seconds.max(1),
        });
        self.timer.start(now);
        self.notifications.cancel(TIMER_NOTIFICATION_ID);
        self.notifications.schedule(notify::request_for(
            NotificationKind::Cluster,
            cluster.cluster_rest_seconds as f64,
        ));
    }

    /// Pause the session clock and freeze the timer; cancels the
    /// pending notification. Idempotent.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        self.cursor.pause(now);
        self.timer.pause(now);
        self.notifications.cancel(TIMER_NOTIFICATION_ID);
    }

    /// Resume the clock and timer; reschedules the notification for the
    /// remaining phase time. Idempotent.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.cursor.resume(now);
        self.timer.resume(now);
        if self.timer.run_state() == RunState::Running {
            let snapshot = self.timer.snapshot(now);
            let kind = NotificationKind::for_mode(&self.timer.mode());
            self.notifications
                .schedule(notify::request_for(kind, snapshot.remaining_seconds));
        }
    }

    /// Fold the session into its persisted summary
    pub fn summary(&self, now: DateTime<Utc>) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            card_id: self.card.id.clone(),
            started_at: self.cursor.started_at(),
            active_seconds: self.elapsed(now).num_seconds(),
            total_tonnage_kg: self.log.total_tonnage_kg(),
            average_rpe: self.log.average_rpe(),
            completion_ratio: self.log.completion_ratio(total_steps(&self.card)),
            by_exercise: self.log.by_exercise(self.library.as_ref()),
            by_muscle: self.log.by_muscle(self.library.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{demo_card, demo_library, demo_one_rep_maxes};
    use crate::notify::RecordingSink;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    fn new_session(sink: RecordingSink) -> WorkoutSession {
        WorkoutSession::new(
            demo_card(),
            Config::default(),
            Box::new(demo_library()),
            Box::new(demo_one_rep_maxes()),
            Box::new(sink),
            t0(),
        )
    }

    fn observed(reps: u32, weight: Option<f64>) -> ObservedValues {
        ObservedValues {
            actual_reps: Some(reps),
            actual_weight_kg: weight,
            rpe: Some(8),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_step_describes_squat() {
        let session = new_session(RecordingSink::new());
        let step = session.current_step().unwrap();

        assert_eq!(step.title, "Squat");
        assert_eq!(step.weight_kg, Some(80.0));
        assert_eq!((step.set_number, step.set_count), (1, 3));
        assert_eq!(step.rest_seconds, 90);
    }

    #[test]
    fn test_full_run_records_every_step() {
        let mut session = new_session(RecordingSink::new());
        let planned = total_steps(session.card());

        let mut now = t0();
        let mut guard = 0;
        while !session.is_completed() {
            now += Duration::seconds(60);
            session.complete_current_step(observed(5, Some(50.0)), now);
            guard += 1;
            assert!(guard < 1000, "session failed to complete");
        }

        assert_eq!(session.records().len(), planned);
        let summary = session.summary(now);
        assert!((summary.completion_ratio - 1.0).abs() < 1e-9);
        assert!(summary.total_tonnage_kg > 0.0);
        assert_eq!(summary.average_rpe, Some(8.0));
        assert!(session.current_step().is_none());
    }

    #[test]
    fn test_completing_rest_step_starts_countdown_with_notification() {
        let sink = RecordingSink::new();
        let mut session = new_session(sink.clone());

        // Finish the three squat sets; the cursor lands on the rest block
        let mut now = t0();
        for _ in 0..3 {
            now += Duration::seconds(60);
            session.complete_current_step(observed(3, Some(80.0)), now);
        }
        let step = session.current_step().unwrap();
        assert_eq!(step.title, "Pausa");
        assert_eq!(
            session.timer_mode(),
            TimerMode::Countdown { seconds: 120 }
        );

        let scheduled = sink.scheduled();
        assert!(!scheduled.is_empty());
        let last = scheduled.last().unwrap();
        assert_eq!(last.identifier, TIMER_NOTIFICATION_ID);
    }

    #[test]
    fn test_tabata_block_configures_interval_timer() {
        let mut session = new_session(RecordingSink::new());

        // Walk to the tabata block: 3 squat sets + 1 rest step
        let mut now = t0();
        for _ in 0..4 {
            now += Duration::seconds(30);
            session.complete_current_step(ObservedValues::default(), now);
        }

        assert_eq!(
            session.timer_mode(),
            TimerMode::Tabata {
                work_seconds: 20,
                rest_seconds: 10,
                rounds: 2
            }
        );
    }

    #[test]
    fn test_reconfirming_a_step_returns_existing_record() {
        let mut session = new_session(RecordingSink::new());
        let now = t0() + Duration::seconds(60);

        let first = session
            .complete_current_step(observed(3, Some(80.0)), now)
            .unwrap();
        session.previous_step(now);
        let again = session
            .complete_current_step(observed(1, Some(60.0)), now + Duration::seconds(30))
            .unwrap();

        assert_eq!(first.key, again.key);
        assert_eq!(again.observed.actual_reps, Some(3));
        assert_eq!(session.records().len(), 1);
    }

    #[test]
    fn test_previous_step_cancels_notification() {
        let sink = RecordingSink::new();
        let mut session = new_session(sink.clone());
        let now = t0() + Duration::seconds(60);

        session.complete_current_step(observed(3, Some(80.0)), now);
        let cancels_before = sink.cancelled().len();
        session.previous_step(now + Duration::seconds(5));
        assert!(sink.cancelled().len() > cancels_before);
    }

    #[test]
    fn test_pause_freezes_elapsed_and_cancels() {
        let sink = RecordingSink::new();
        let mut session = new_session(sink.clone());

        let before = t0() + Duration::seconds(120);
        let elapsed_before = session.elapsed(before);
        session.pause(before);

        let much_later = before + Duration::hours(2);
        assert_eq!(session.elapsed(much_later), elapsed_before);
        session.resume(much_later);
        assert_eq!(session.elapsed(much_later), elapsed_before);
        assert!(sink.cancelled().iter().any(|c| c == TIMER_NOTIFICATION_ID));
    }

    #[test]
    fn test_cluster_pause_uses_cluster_notification() {
        let sink = RecordingSink::new();
        let mut session = new_session(sink.clone());

        // Walk to the bench cluster set: 3 squat sets, rest, 4 tabata steps
        let mut now = t0();
        for _ in 0..8 {
            now += Duration::seconds(30);
            session.complete_current_step(ObservedValues::default(), now);
        }
        let step = session.current_step().unwrap();
        assert_eq!(step.title, "Panca Piana");
        assert!(step.cluster_curve.is_some());
        assert_eq!(step.cluster_description.as_deref(), Some("3 clusters of 2 reps, 20s rest"));

        session.start_cluster_pause(now);
        assert_eq!(session.timer_mode(), TimerMode::Countdown { seconds: 20 });
        let last = sink.scheduled().last().unwrap().clone();
        assert_eq!(last.title, "Cluster");
    }

    #[test]
    fn test_summary_breakdown_groups_by_exercise() {
        let mut session = new_session(RecordingSink::new());
        let mut now = t0();
        while !session.is_completed() {
            now += Duration::seconds(45);
            session.complete_current_step(observed(5, Some(40.0)), now);
        }
        let summary = session.summary(now);
        assert!(summary.by_exercise.contains_key("Squat"));
        assert!(summary.by_exercise.contains_key("Burpees"));
        // The standalone rest block contributes no exercise entry
        assert!(!summary.by_exercise.contains_key("Pausa"));
        assert!(summary.by_muscle.contains_key(&MuscleCategory::Legs));
        assert!(summary.by_muscle.contains_key(&MuscleCategory::Chest));
    }
}

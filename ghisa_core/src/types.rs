//! Core domain types for the workout execution engine.
//!
//! This module defines the plan tree the engine traverses:
//! - Cards, blocks and their kind variants
//! - Exercise items and work sets
//! - Load variants and advanced-method sub-records (cluster, rest-pause)
//! - Custom training methods (rep-by-rep load curves)
//!
//! The plan tree is read-only for the duration of a session; editing a
//! plan mid-session requires rebuilding the session from scratch.

use serde::{Deserialize, Serialize};

// ============================================================================
// Method Kinds
// ============================================================================

/// Training method attached to a method block
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    Superset,
    Tabata,
    Circuit,
    Emom,
    Amrap,
    Dropset,
    Pyramid,
    GiantSet,
}

impl MethodKind {
    /// Minimum number of exercises a block of this method must carry
    pub fn min_exercises(&self) -> usize {
        match self {
            MethodKind::Superset => 2,
            MethodKind::Circuit => 2,
            MethodKind::GiantSet => 3,
            MethodKind::Tabata
            | MethodKind::Emom
            | MethodKind::Amrap
            | MethodKind::Dropset
            | MethodKind::Pyramid => 1,
        }
    }

    /// Maximum number of exercises, `None` when unbounded
    pub fn max_exercises(&self) -> Option<usize> {
        match self {
            MethodKind::Superset => Some(2),
            MethodKind::Dropset | MethodKind::Pyramid => Some(1),
            MethodKind::Tabata
            | MethodKind::Circuit
            | MethodKind::Emom
            | MethodKind::Amrap
            | MethodKind::GiantSet => None,
        }
    }

    /// Whether the method is driven by work/rest interval parameters
    pub fn is_interval_based(&self) -> bool {
        matches!(self, MethodKind::Tabata | MethodKind::Circuit)
    }
}

// ============================================================================
// Block Types
// ============================================================================

/// Interval parameters for Tabata-like methods
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct IntervalParams {
    pub work_seconds: u32,
    pub rest_seconds: u32,
    pub rounds: u32,
    pub recovery_between_rounds_seconds: u32,
}

/// Variant tag for a block within a card
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// Plain exercises performed set by set
    Simple,
    /// A predefined training method (superset, tabata, ...)
    Method { kind: MethodKind },
    /// A user-defined rep-by-rep method, referenced by id
    CustomMethod { method_id: String },
    /// A standalone rest period; duration comes from `global_rest_seconds`
    Rest,
}

/// One block of a workout card
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    /// Position among siblings, unique and contiguous from 0
    pub order: u32,
    pub kind: BlockKind,
    /// Rounds for method blocks, ignored for simple blocks
    pub global_sets: u32,
    /// Default rest between sets; the full duration for rest blocks
    pub global_rest_seconds: u32,
    /// Populated only for interval-based methods (tabata, circuit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervals: Option<IntervalParams>,
    pub exercises: Vec<ExerciseItem>,
}

impl Block {
    pub fn is_rest(&self) -> bool {
        matches!(self.kind, BlockKind::Rest)
    }

    pub fn method_kind(&self) -> Option<MethodKind> {
        match self.kind {
            BlockKind::Method { kind } => Some(kind),
            _ => None,
        }
    }
}

// ============================================================================
// Exercise and Set Types
// ============================================================================

/// An exercise slotted into a block
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseItem {
    /// Reference into the external exercise library
    pub exercise_id: String,
    pub order: u32,
    /// Overrides the block's `global_rest_seconds` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<u32>,
    pub sets: Vec<WorkSet>,
}

impl ExerciseItem {
    /// Effective rest between sets for this exercise
    pub fn effective_rest_seconds(&self, block: &Block) -> u32 {
        self.rest_seconds.unwrap_or(block.global_rest_seconds)
    }
}

/// What a set asks the athlete to do
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SetTarget {
    Reps { count: u32 },
    Duration { seconds: u32 },
}

/// Prescribed load for a set
///
/// Absolute and percentage are mutually exclusive as the active value;
/// the inactive one may be cached so toggling back restores it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Load {
    Absolute {
        kg: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_pct: Option<f64>,
    },
    Percentage {
        pct: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_kg: Option<f64>,
    },
    Bodyweight,
}

/// Shape of the load curve across cluster mini-sets
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionShape {
    Constant,
    Ascending,
    Descending,
    Wave,
}

/// Cluster-set sub-record: the set is split into mini-sets of
/// `cluster_size` reps separated by short intra-set pauses.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClusterConfig {
    pub cluster_size: u32,
    pub cluster_rest_seconds: u32,
    pub shape: ProgressionShape,
    pub min_pct: Option<f64>,
    pub max_pct: Option<f64>,
}

/// Rest-pause sub-record: brief pauses extending a set at a fixed load
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RestPauseConfig {
    pub pause_count: u32,
    pub pause_seconds: u32,
}

/// One prescribed set within an exercise item
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkSet {
    pub order: u32,
    pub target: SetTarget,
    pub load: Load,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<ClusterConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_pause: Option<RestPauseConfig>,
}

impl WorkSet {
    pub fn reps(&self) -> Option<u32> {
        match self.target {
            SetTarget::Reps { count } => Some(count),
            SetTarget::Duration { .. } => None,
        }
    }
}

// ============================================================================
// Custom Training Methods
// ============================================================================

/// Per-rep configuration of a custom method
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct RepConfiguration {
    /// Position in the rep sequence, unique and contiguous from 0
    pub rep_order: u32,
    /// Delta over the base load, clamped to [-50, +100]
    pub load_delta_pct: f64,
    pub rest_after_seconds: u32,
}

/// A user-defined rep-by-rep load curve
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomTrainingMethod {
    pub id: String,
    pub name: String,
    pub reps: Vec<RepConfiguration>,
}

// ============================================================================
// Card
// ============================================================================

/// A complete workout plan: an ordered list of blocks
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub blocks: Vec<Block>,
    /// Custom methods referenced by `BlockKind::CustomMethod` blocks
    #[serde(default)]
    pub custom_methods: Vec<CustomTrainingMethod>,
}

impl Card {
    pub fn custom_method(&self, method_id: &str) -> Option<&CustomTrainingMethod> {
        self.custom_methods.iter().find(|m| m.id == method_id)
    }
}

// ============================================================================
// External-interface keys
// ============================================================================

/// The fixed enumeration of lifts the one-rep-max provider is keyed by
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BigLift {
    Squat,
    BenchPress,
    Deadlift,
    OverheadPress,
    BarbellRow,
}

/// Coarse muscle grouping used for session breakdown reports
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MuscleCategory {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Core,
    FullBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_exercise_bounds() {
        assert_eq!(MethodKind::Superset.min_exercises(), 2);
        assert_eq!(MethodKind::Superset.max_exercises(), Some(2));
        assert_eq!(MethodKind::Tabata.min_exercises(), 1);
        assert_eq!(MethodKind::Tabata.max_exercises(), None);
        assert_eq!(MethodKind::Dropset.max_exercises(), Some(1));
    }

    #[test]
    fn test_interval_based_methods() {
        assert!(MethodKind::Tabata.is_interval_based());
        assert!(MethodKind::Circuit.is_interval_based());
        assert!(!MethodKind::Emom.is_interval_based());
        assert!(!MethodKind::Superset.is_interval_based());
    }

    #[test]
    fn test_effective_rest_override() {
        let block = Block {
            order: 0,
            kind: BlockKind::Simple,
            global_sets: 1,
            global_rest_seconds: 90,
            intervals: None,
            exercises: vec![],
        };
        let with_override = ExerciseItem {
            exercise_id: "squat".into(),
            order: 0,
            rest_seconds: Some(120),
            sets: vec![],
        };
        let without = ExerciseItem {
            exercise_id: "squat".into(),
            order: 1,
            rest_seconds: None,
            sets: vec![],
        };
        assert_eq!(with_override.effective_rest_seconds(&block), 120);
        assert_eq!(without.effective_rest_seconds(&block), 90);
    }

    #[test]
    fn test_load_serde_roundtrip() {
        let load = Load::Percentage {
            pct: 75.0,
            last_kg: Some(80.0),
        };
        let json = serde_json::to_string(&load).unwrap();
        let back: Load = serde_json::from_str(&json).unwrap();
        assert_eq!(load, back);
    }
}

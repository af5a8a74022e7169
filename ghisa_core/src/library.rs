//! External collaborator seams: exercise library and one-rep-max provider.
//!
//! The engine only ever reads through these traits. A missing exercise
//! reference degrades to a placeholder label instead of failing, and an
//! unknown one-rep max leaves percentage loads unresolved.

use crate::types::{BigLift, MuscleCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label shown when an exercise reference cannot be resolved
pub const PLACEHOLDER_EXERCISE_NAME: &str = "Exercise";

/// What the engine reads about an exercise
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseInfo {
    pub name: String,
    pub primary_muscle: MuscleCategory,
    /// The big lift whose one-rep max drives percentage loads, if any
    pub big_lift: Option<BigLift>,
}

/// Read-only exercise lookup, implemented by the host application
pub trait ExerciseLibrary {
    fn lookup(&self, exercise_id: &str) -> Option<&ExerciseInfo>;

    /// Display name for an exercise, placeholder when unknown
    fn display_name(&self, exercise_id: &str) -> String {
        self.lookup(exercise_id)
            .map(|info| info.name.clone())
            .unwrap_or_else(|| PLACEHOLDER_EXERCISE_NAME.to_string())
    }

    fn big_lift_for(&self, exercise_id: &str) -> Option<BigLift> {
        self.lookup(exercise_id).and_then(|info| info.big_lift)
    }
}

/// Read-only one-rep-max source, keyed by the fixed big-lift enumeration
pub trait OneRepMaxProvider {
    fn one_rep_max(&self, lift: BigLift) -> Option<f64>;
}

/// Map-backed exercise library for tests and the CLI
#[derive(Clone, Debug, Default)]
pub struct InMemoryExerciseLibrary {
    entries: HashMap<String, ExerciseInfo>,
}

impl InMemoryExerciseLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        primary_muscle: MuscleCategory,
        big_lift: Option<BigLift>,
    ) {
        self.entries.insert(
            id.into(),
            ExerciseInfo {
                name: name.into(),
                primary_muscle,
                big_lift,
            },
        );
    }
}

impl ExerciseLibrary for InMemoryExerciseLibrary {
    fn lookup(&self, exercise_id: &str) -> Option<&ExerciseInfo> {
        self.entries.get(exercise_id)
    }
}

/// Map-backed one-rep-max provider
#[derive(Clone, Debug, Default)]
pub struct StaticOneRepMax {
    maxes: HashMap<BigLift, f64>,
}

impl StaticOneRepMax {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, lift: BigLift, kg: f64) {
        self.maxes.insert(lift, kg);
    }
}

impl OneRepMaxProvider for StaticOneRepMax {
    fn one_rep_max(&self, lift: BigLift) -> Option<f64> {
        self.maxes.get(&lift).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_exercise_degrades_to_placeholder() {
        let library = InMemoryExerciseLibrary::new();
        assert_eq!(library.display_name("ghost"), PLACEHOLDER_EXERCISE_NAME);
    }

    #[test]
    fn test_lookup_known_exercise() {
        let mut library = InMemoryExerciseLibrary::new();
        library.insert("squat", "Squat", MuscleCategory::Legs, Some(BigLift::Squat));

        assert_eq!(library.display_name("squat"), "Squat");
        assert_eq!(library.big_lift_for("squat"), Some(BigLift::Squat));
        assert_eq!(
            library.lookup("squat").unwrap().primary_muscle,
            MuscleCategory::Legs
        );
    }

    #[test]
    fn test_one_rep_max_provider() {
        let mut maxes = StaticOneRepMax::new();
        maxes.set(BigLift::Deadlift, 180.0);

        assert_eq!(maxes.one_rep_max(BigLift::Deadlift), Some(180.0));
        assert_eq!(maxes.one_rep_max(BigLift::BenchPress), None);
    }
}

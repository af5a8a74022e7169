//! Built-in demo content: a sample workout card and the matching
//! exercise library and one-rep-max figures.
//!
//! Used by the CLI for previews and simulated runs, and by tests across
//! the crate. The builder helpers double as a compact way to assemble
//! plan trees with contiguous order values.

use crate::library::{InMemoryExerciseLibrary, StaticOneRepMax};
use crate::types::*;
use once_cell::sync::Lazy;

/// Cached demo card - built once and cloned on demand
static DEMO_CARD: Lazy<Card> = Lazy::new(build_demo_card);

/// Set of `reps` repetitions at the given load
pub fn work_set(reps: u32, load: Load) -> WorkSet {
    WorkSet {
        order: 0,
        target: SetTarget::Reps { count: reps },
        load,
        cluster: None,
        rest_pause: None,
    }
}

/// Timed set of `seconds` at the given load
pub fn duration_set(seconds: u32, load: Load) -> WorkSet {
    WorkSet {
        order: 0,
        target: SetTarget::Duration { seconds },
        load,
        cluster: None,
        rest_pause: None,
    }
}

/// Exercise item with its sets renumbered contiguously
pub fn exercise_item(exercise_id: &str, sets: Vec<WorkSet>) -> ExerciseItem {
    let mut item = ExerciseItem {
        exercise_id: exercise_id.to_string(),
        order: 0,
        rest_seconds: None,
        sets,
    };
    for (i, set) in item.sets.iter_mut().enumerate() {
        set.order = i as u32;
    }
    item
}

fn renumber_exercises(exercises: &mut [ExerciseItem]) {
    for (i, exercise) in exercises.iter_mut().enumerate() {
        exercise.order = i as u32;
    }
}

pub fn simple_block(mut exercises: Vec<ExerciseItem>, rest_seconds: u32) -> Block {
    renumber_exercises(&mut exercises);
    Block {
        order: 0,
        kind: BlockKind::Simple,
        global_sets: 1,
        global_rest_seconds: rest_seconds,
        intervals: None,
        exercises,
    }
}

pub fn method_block(
    kind: MethodKind,
    mut exercises: Vec<ExerciseItem>,
    global_sets: u32,
    rest_seconds: u32,
) -> Block {
    renumber_exercises(&mut exercises);
    Block {
        order: 0,
        kind: BlockKind::Method { kind },
        global_sets,
        global_rest_seconds: rest_seconds,
        intervals: None,
        exercises,
    }
}

pub fn rest_block(seconds: u32) -> Block {
    Block {
        order: 0,
        kind: BlockKind::Rest,
        global_sets: 1,
        global_rest_seconds: seconds,
        intervals: None,
        exercises: vec![],
    }
}

fn build_demo_card() -> Card {
    // Block 0: straight sets of squat
    let squat = exercise_item(
        "squat",
        vec![
            work_set(3, Load::Absolute { kg: 80.0, last_pct: None }),
            work_set(3, Load::Absolute { kg: 80.0, last_pct: None }),
            work_set(3, Load::Absolute { kg: 80.0, last_pct: None }),
        ],
    );

    // Block 2: tabata stations
    let mut tabata = method_block(
        MethodKind::Tabata,
        vec![
            exercise_item("burpees", vec![duration_set(20, Load::Bodyweight)]),
            exercise_item("mountain_climbers", vec![duration_set(20, Load::Bodyweight)]),
        ],
        2,
        0,
    );
    tabata.intervals = Some(IntervalParams {
        work_seconds: 20,
        rest_seconds: 10,
        rounds: 2,
        recovery_between_rounds_seconds: 60,
    });

    // Block 3: bench with a cluster set and a rest-pause set
    let mut cluster_set = work_set(6, Load::Percentage { pct: 75.0, last_kg: None });
    cluster_set.cluster = Some(ClusterConfig {
        cluster_size: 2,
        cluster_rest_seconds: 20,
        shape: ProgressionShape::Ascending,
        min_pct: Some(80.0),
        max_pct: Some(95.0),
    });
    let mut rest_pause_set = work_set(8, Load::Percentage { pct: 70.0, last_kg: None });
    rest_pause_set.rest_pause = Some(RestPauseConfig {
        pause_count: 2,
        pause_seconds: 15,
    });
    let bench = exercise_item("bench", vec![cluster_set, rest_pause_set]);

    // Block 4: custom wave method on the deadlift
    let custom = Block {
        order: 0,
        kind: BlockKind::CustomMethod {
            method_id: "onde_crescenti".into(),
        },
        global_sets: 1,
        global_rest_seconds: 120,
        intervals: None,
        exercises: vec![exercise_item(
            "deadlift",
            vec![work_set(4, Load::Absolute { kg: 150.0, last_pct: None })],
        )],
    };

    let mut card = Card {
        id: "demo".into(),
        name: "Seduta dimostrativa".into(),
        blocks: vec![
            simple_block(vec![squat], 90),
            rest_block(120),
            tabata,
            simple_block(vec![bench], 120),
            custom,
        ],
        custom_methods: vec![CustomTrainingMethod {
            id: "onde_crescenti".into(),
            name: "Onde Crescenti".into(),
            reps: vec![
                RepConfiguration { rep_order: 0, load_delta_pct: 0.0, rest_after_seconds: 0 },
                RepConfiguration { rep_order: 1, load_delta_pct: 0.0, rest_after_seconds: 0 },
                RepConfiguration { rep_order: 2, load_delta_pct: 10.0, rest_after_seconds: 30 },
                RepConfiguration { rep_order: 3, load_delta_pct: 10.0, rest_after_seconds: 30 },
            ],
        }],
    };
    crate::plan::renumber(&mut card);
    card
}

/// Demo workout card used by the CLI and tests
pub fn demo_card() -> Card {
    DEMO_CARD.clone()
}

/// Exercise library matching the demo card's references
pub fn demo_library() -> InMemoryExerciseLibrary {
    let mut library = InMemoryExerciseLibrary::new();
    library.insert("squat", "Squat", MuscleCategory::Legs, Some(BigLift::Squat));
    library.insert("bench", "Panca Piana", MuscleCategory::Chest, Some(BigLift::BenchPress));
    library.insert("deadlift", "Stacco da Terra", MuscleCategory::Back, Some(BigLift::Deadlift));
    library.insert("burpees", "Burpees", MuscleCategory::FullBody, None);
    library.insert("mountain_climbers", "Mountain Climbers", MuscleCategory::Core, None);
    library
}

/// One-rep maxes matching the demo card's percentage loads
pub fn demo_one_rep_maxes() -> StaticOneRepMax {
    let mut maxes = StaticOneRepMax::new();
    maxes.set(BigLift::Squat, 100.0);
    maxes.set(BigLift::BenchPress, 100.0);
    maxes.set(BigLift::Deadlift, 180.0);
    maxes
}

//! Human-readable execution trace of a workout card.
//!
//! One line per execution step, derived purely from the plan model and
//! default parameters. This is a reporting artifact for debugging and
//! previews, not a control surface; the wording keeps the app's Italian
//! step log format.

use crate::library::{ExerciseLibrary, OneRepMaxProvider};
use crate::loads::{custom_method_rep_groups, resolve_weight};
use crate::types::{Block, BlockKind, Card, ExerciseItem, WorkSet};

/// Italian duration wording: "2 minuti", "1 minuto 30 secondi", "20 secondi"
pub fn format_duration_it(seconds: u32) -> String {
    let minutes = seconds / 60;
    let rest = seconds % 60;
    let minute_word = if minutes == 1 { "minuto" } else { "minuti" };
    let second_word = if rest == 1 { "secondo" } else { "secondi" };

    match (minutes, rest) {
        (0, r) => format!("{r} {second_word}"),
        (m, 0) => format!("{m} {minute_word}"),
        (m, r) => format!("{m} {minute_word} {r} {second_word}"),
    }
}

/// Weight without a spurious decimal point: 80 -> "80", 82.5 -> "82.5"
fn format_weight(kg: f64) -> String {
    if (kg - kg.round()).abs() < 1e-9 {
        format!("{:.0}", kg)
    } else {
        format!("{:.1}", kg)
    }
}

fn one_rep_max_for(
    exercise: &ExerciseItem,
    library: &dyn ExerciseLibrary,
    maxes: &dyn OneRepMaxProvider,
) -> Option<f64> {
    library
        .big_lift_for(&exercise.exercise_id)
        .and_then(|lift| maxes.one_rep_max(lift))
}

fn set_line(name: &str, set_number: usize, set_count: usize, set: &WorkSet, one_rep_max: Option<f64>) -> String {
    match resolve_weight(&set.load, one_rep_max) {
        Some(kg) => format!(
            "Esercizio {name} {set_number} serie di {set_count} con {} kg",
            format_weight(kg)
        ),
        None => format!("Esercizio {name} {set_number} serie di {set_count}"),
    }
}

fn trace_simple_block(
    lines: &mut Vec<String>,
    block: &Block,
    library: &dyn ExerciseLibrary,
    maxes: &dyn OneRepMaxProvider,
) {
    for exercise in &block.exercises {
        let name = library.display_name(&exercise.exercise_id);
        let one_rep_max = one_rep_max_for(exercise, library, maxes);
        let rest = exercise.effective_rest_seconds(block);
        let set_count = exercise.sets.len();

        for (i, set) in exercise.sets.iter().enumerate() {
            lines.push(set_line(&name, i + 1, set_count, set, one_rep_max));
            if i + 1 < set_count && rest > 0 {
                lines.push(format!("Riposo tra le serie {}", format_duration_it(rest)));
            }
        }
    }
}

fn trace_interval_block(lines: &mut Vec<String>, block: &Block, library: &dyn ExerciseLibrary) {
    let Some(intervals) = block.intervals else {
        return;
    };
    if block.exercises.is_empty() {
        return;
    }
    for round in 1..=intervals.rounds {
        // Stations rotate across rounds
        let exercise = &block.exercises[(round as usize - 1) % block.exercises.len()];
        let name = library.display_name(&exercise.exercise_id);
        lines.push(format!(
            "Tabata Round {round} - {name} lavoro {}",
            format_duration_it(intervals.work_seconds)
        ));
        lines.push(format!(
            "Recupero Tabata {}",
            format_duration_it(intervals.rest_seconds)
        ));
    }
    if intervals.recovery_between_rounds_seconds > 0 {
        lines.push(format!(
            "Recupero finale {}",
            format_duration_it(intervals.recovery_between_rounds_seconds)
        ));
    }
}

fn trace_method_block(
    lines: &mut Vec<String>,
    block: &Block,
    library: &dyn ExerciseLibrary,
    maxes: &dyn OneRepMaxProvider,
) {
    let rounds = block.global_sets.max(1) as usize;
    for round in 1..=rounds {
        for exercise in &block.exercises {
            let name = library.display_name(&exercise.exercise_id);
            let one_rep_max = one_rep_max_for(exercise, library, maxes);
            // A round uses its matching set when present, the first otherwise
            if let Some(set) = exercise.sets.get(round - 1).or_else(|| exercise.sets.first()) {
                lines.push(set_line(&name, round, rounds, set, one_rep_max));
            }
        }
        if round < rounds && block.global_rest_seconds > 0 {
            lines.push(format!(
                "Riposo tra le serie {}",
                format_duration_it(block.global_rest_seconds)
            ));
        }
    }
}

fn trace_custom_block(
    lines: &mut Vec<String>,
    card: &Card,
    block: &Block,
    method_id: &str,
    library: &dyn ExerciseLibrary,
    maxes: &dyn OneRepMaxProvider,
) {
    let Some(method) = card.custom_method(method_id) else {
        lines.push("Metodo personalizzato sconosciuto".to_string());
        return;
    };
    lines.push(format!("Metodo {}", method.name));

    // Base load comes from the first set of the block's first exercise
    let base_load = block.exercises.first().and_then(|exercise| {
        let one_rep_max = one_rep_max_for(exercise, library, maxes);
        exercise
            .sets
            .first()
            .and_then(|set| resolve_weight(&set.load, one_rep_max))
    });
    let Some(base_load) = base_load else {
        return;
    };

    for group in custom_method_rep_groups(&method.reps, base_load) {
        if group.start_rep == group.end_rep {
            lines.push(format!(
                "Ripetizione {} con {} kg",
                group.start_rep,
                format_weight(group.load)
            ));
        } else {
            lines.push(format!(
                "Ripetizioni {}-{} con {} kg",
                group.start_rep,
                group.end_rep,
                format_weight(group.load)
            ));
        }
        if group.rest_after_seconds > 0 {
            lines.push(format!(
                "Riposo dopo la ripetizione {}",
                format_duration_it(group.rest_after_seconds)
            ));
        }
    }
}

/// One line per execution step for the whole card
pub fn execution_trace(
    card: &Card,
    library: &dyn ExerciseLibrary,
    maxes: &dyn OneRepMaxProvider,
) -> Vec<String> {
    let mut lines = Vec::new();

    for block in &card.blocks {
        match &block.kind {
            BlockKind::Rest => {
                lines.push(format!(
                    "Blocco Pausa {}",
                    format_duration_it(block.global_rest_seconds)
                ));
            }
            BlockKind::Simple => trace_simple_block(&mut lines, block, library, maxes),
            BlockKind::Method { kind } if kind.is_interval_based() => {
                trace_interval_block(&mut lines, block, library)
            }
            BlockKind::Method { .. } => trace_method_block(&mut lines, block, library, maxes),
            BlockKind::CustomMethod { method_id } => {
                trace_custom_block(&mut lines, card, block, method_id, library, maxes)
            }
        }
    }

    lines
}

//! Plan model validation and editing helpers.
//!
//! Validation here is soft by design: a warning never blocks saving or
//! executing a card. The only hard gate is `is_draft`, which the UI uses
//! to decide whether a card can be scheduled.

use crate::types::{Card, Load, MethodKind, WorkSet};
use std::fmt;

/// Soft validation finding over a card
#[derive(Clone, Debug, PartialEq)]
pub enum PlanWarning {
    /// Cluster size exceeds the set's rep count
    ClusterSizeExceedsReps {
        block: usize,
        exercise: usize,
        set: usize,
        cluster_size: u32,
        reps: u32,
    },
    /// Method block exercise count outside [min, max]
    MethodExerciseCount {
        block: usize,
        kind: MethodKind,
        count: usize,
        min: usize,
        max: Option<usize>,
    },
    /// Load direction does not match the method (dropset descends, pyramid peaks)
    LoadDirection { block: usize, kind: MethodKind, detail: String },
    /// Rest-pause sub-record with zero pauses does nothing
    EmptyRestPause { block: usize, exercise: usize, set: usize },
    /// Sibling order values are not contiguous from zero
    NonContiguousOrder { context: String },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::ClusterSizeExceedsReps {
                block,
                exercise,
                set,
                cluster_size,
                reps,
            } => write!(
                f,
                "block {block}, exercise {exercise}, set {set}: cluster size {cluster_size} exceeds {reps} reps"
            ),
            PlanWarning::MethodExerciseCount {
                block,
                kind,
                count,
                min,
                max,
            } => match max {
                Some(max) => write!(
                    f,
                    "block {block}: {kind:?} needs {min}-{max} exercises, has {count}"
                ),
                None => write!(
                    f,
                    "block {block}: {kind:?} needs at least {min} exercises, has {count}"
                ),
            },
            PlanWarning::LoadDirection { block, kind, detail } => {
                write!(f, "block {block}: {kind:?} load direction: {detail}")
            }
            PlanWarning::EmptyRestPause { block, exercise, set } => write!(
                f,
                "block {block}, exercise {exercise}, set {set}: rest-pause with zero pauses"
            ),
            PlanWarning::NonContiguousOrder { context } => {
                write!(f, "{context}: order values are not contiguous from 0")
            }
        }
    }
}

/// Whether a method block's exercise count satisfies its kind's bounds
fn method_count_ok(kind: MethodKind, count: usize) -> bool {
    let min = kind.min_exercises();
    let max = kind.max_exercises();
    count >= min && max.map_or(true, |m| count <= m)
}

/// A card is a draft until it can actually be executed: it has at least
/// one block, every non-rest block has exercises, and every method block
/// respects its exercise-count bounds.
pub fn is_draft(card: &Card) -> bool {
    if card.blocks.is_empty() {
        return true;
    }
    for block in &card.blocks {
        if block.is_rest() {
            continue;
        }
        if block.exercises.is_empty() {
            return true;
        }
        if let Some(kind) = block.method_kind() {
            if !method_count_ok(kind, block.exercises.len()) {
                return true;
            }
        }
    }
    false
}

/// Comparable magnitude of a load, for direction checks. Mixed absolute
/// and percentage loads within one exercise are not comparable.
fn load_magnitude(load: &Load) -> Option<(bool, f64)> {
    match load {
        Load::Absolute { kg, .. } => Some((true, *kg)),
        Load::Percentage { pct, .. } => Some((false, *pct)),
        Load::Bodyweight => None,
    }
}

fn check_load_direction(block_idx: usize, kind: MethodKind, sets: &[WorkSet]) -> Option<PlanWarning> {
    let mags: Vec<f64> = {
        let mut out = Vec::with_capacity(sets.len());
        let mut unit: Option<bool> = None;
        for set in sets {
            let (is_abs, mag) = load_magnitude(&set.load)?;
            match unit {
                Some(u) if u != is_abs => return None,
                _ => unit = Some(is_abs),
            }
            out.push(mag);
        }
        out
    };
    if mags.len() < 2 {
        return None;
    }

    match kind {
        MethodKind::Dropset => {
            if mags.windows(2).any(|w| w[1] > w[0]) {
                return Some(PlanWarning::LoadDirection {
                    block: block_idx,
                    kind,
                    detail: "dropset loads should not increase across sets".into(),
                });
            }
        }
        MethodKind::Pyramid => {
            // Ascend to a single peak, then descend
            let peak = mags
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(i, _)| i)
                .unwrap_or(0);
            let ascends = mags[..=peak].windows(2).all(|w| w[1] >= w[0]);
            let descends = mags[peak..].windows(2).all(|w| w[1] <= w[0]);
            if !(ascends && descends) {
                return Some(PlanWarning::LoadDirection {
                    block: block_idx,
                    kind,
                    detail: "pyramid loads should ascend to a peak then descend".into(),
                });
            }
        }
        _ => {}
    }
    None
}

fn check_order_contiguous(orders: impl Iterator<Item = u32>, context: &str) -> Option<PlanWarning> {
    for (expected, order) in orders.enumerate() {
        if order as usize != expected {
            return Some(PlanWarning::NonContiguousOrder {
                context: context.to_string(),
            });
        }
    }
    None
}

/// Run all soft checks over a card. Never blocks saving or executing.
pub fn validate(card: &Card) -> Vec<PlanWarning> {
    let mut warnings = Vec::new();

    if let Some(w) = check_order_contiguous(card.blocks.iter().map(|b| b.order), "blocks") {
        warnings.push(w);
    }

    for (bi, block) in card.blocks.iter().enumerate() {
        if let Some(w) = check_order_contiguous(
            block.exercises.iter().map(|e| e.order),
            &format!("block {bi} exercises"),
        ) {
            warnings.push(w);
        }

        if let Some(kind) = block.method_kind() {
            if !method_count_ok(kind, block.exercises.len()) {
                warnings.push(PlanWarning::MethodExerciseCount {
                    block: bi,
                    kind,
                    count: block.exercises.len(),
                    min: kind.min_exercises(),
                    max: kind.max_exercises(),
                });
            }
        }

        for (ei, exercise) in block.exercises.iter().enumerate() {
            if let Some(w) = check_order_contiguous(
                exercise.sets.iter().map(|s| s.order),
                &format!("block {bi} exercise {ei} sets"),
            ) {
                warnings.push(w);
            }

            for (si, set) in exercise.sets.iter().enumerate() {
                if let (Some(cluster), Some(reps)) = (&set.cluster, set.reps()) {
                    if cluster.cluster_size > reps {
                        warnings.push(PlanWarning::ClusterSizeExceedsReps {
                            block: bi,
                            exercise: ei,
                            set: si,
                            cluster_size: cluster.cluster_size,
                            reps,
                        });
                    }
                }
                if let Some(rp) = &set.rest_pause {
                    if rp.pause_count == 0 {
                        warnings.push(PlanWarning::EmptyRestPause {
                            block: bi,
                            exercise: ei,
                            set: si,
                        });
                    }
                }
            }

            if let Some(kind) = block.method_kind() {
                if let Some(w) = check_load_direction(bi, kind, &exercise.sets) {
                    warnings.push(w);
                }
            }
        }
    }

    warnings
}

/// Renumber sibling `order` values to be contiguous from zero.
/// Call after reordering or deleting blocks, exercises or sets.
pub fn renumber(card: &mut Card) {
    for (bi, block) in card.blocks.iter_mut().enumerate() {
        block.order = bi as u32;
        for (ei, exercise) in block.exercises.iter_mut().enumerate() {
            exercise.order = ei as u32;
            for (si, set) in exercise.sets.iter_mut().enumerate() {
                set.order = si as u32;
            }
        }
    }
}

/// Remove a block and renumber the survivors. Out-of-range index is a no-op.
pub fn remove_block(card: &mut Card, index: usize) {
    if index < card.blocks.len() {
        card.blocks.remove(index);
        renumber(card);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{method_block, simple_block, work_set};
    use crate::types::*;

    fn card_with(blocks: Vec<Block>) -> Card {
        let mut card = Card {
            id: "test".into(),
            name: "Test".into(),
            blocks,
            custom_methods: vec![],
        };
        renumber(&mut card);
        card
    }

    #[test]
    fn test_empty_card_is_draft() {
        let card = card_with(vec![]);
        assert!(is_draft(&card));
    }

    #[test]
    fn test_block_without_exercises_is_draft() {
        let card = card_with(vec![simple_block(vec![], 90)]);
        assert!(is_draft(&card));
    }

    #[test]
    fn test_method_block_below_min_is_draft() {
        // Superset needs two exercises, this one has one
        let ex = ExerciseItem {
            exercise_id: "squat".into(),
            order: 0,
            rest_seconds: None,
            sets: vec![work_set(5, Load::Bodyweight)],
        };
        let card = card_with(vec![method_block(MethodKind::Superset, vec![ex], 3, 60)]);
        assert!(is_draft(&card));
        assert!(validate(&card)
            .iter()
            .any(|w| matches!(w, PlanWarning::MethodExerciseCount { .. })));
    }

    #[test]
    fn test_rest_block_alone_is_not_draft_blocker() {
        let rest = Block {
            order: 0,
            kind: BlockKind::Rest,
            global_sets: 1,
            global_rest_seconds: 120,
            intervals: None,
            exercises: vec![],
        };
        let ex = ExerciseItem {
            exercise_id: "squat".into(),
            order: 0,
            rest_seconds: None,
            sets: vec![work_set(5, Load::Bodyweight)],
        };
        let card = card_with(vec![simple_block(vec![ex], 90), rest]);
        assert!(!is_draft(&card));
    }

    #[test]
    fn test_cluster_size_exceeding_reps_warns() {
        let mut set = work_set(3, Load::Absolute { kg: 100.0, last_pct: None });
        set.cluster = Some(ClusterConfig {
            cluster_size: 5,
            cluster_rest_seconds: 20,
            shape: ProgressionShape::Constant,
            min_pct: Some(80.0),
            max_pct: Some(90.0),
        });
        let ex = ExerciseItem {
            exercise_id: "squat".into(),
            order: 0,
            rest_seconds: None,
            sets: vec![set],
        };
        let card = card_with(vec![simple_block(vec![ex], 90)]);
        let warnings = validate(&card);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, PlanWarning::ClusterSizeExceedsReps { .. })));
        // Soft only: the card still executes
        assert!(!is_draft(&card));
    }

    #[test]
    fn test_dropset_increasing_load_warns() {
        let sets = vec![
            work_set(8, Load::Absolute { kg: 60.0, last_pct: None }),
            work_set(8, Load::Absolute { kg: 70.0, last_pct: None }),
        ];
        let mut sets = sets;
        for (i, s) in sets.iter_mut().enumerate() {
            s.order = i as u32;
        }
        let ex = ExerciseItem {
            exercise_id: "bench".into(),
            order: 0,
            rest_seconds: None,
            sets,
        };
        let card = card_with(vec![method_block(MethodKind::Dropset, vec![ex], 1, 60)]);
        assert!(validate(&card)
            .iter()
            .any(|w| matches!(w, PlanWarning::LoadDirection { .. })));
    }

    #[test]
    fn test_renumber_after_removal() {
        let ex = ExerciseItem {
            exercise_id: "squat".into(),
            order: 0,
            rest_seconds: None,
            sets: vec![work_set(5, Load::Bodyweight)],
        };
        let mut card = card_with(vec![
            simple_block(vec![ex.clone()], 90),
            simple_block(vec![ex.clone()], 90),
            simple_block(vec![ex], 90),
        ]);
        remove_block(&mut card, 1);
        let orders: Vec<u32> = card.blocks.iter().map(|b| b.order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert!(validate(&card).is_empty());
    }
}

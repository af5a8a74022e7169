//! Session cursor: the traversal state machine over a workout card.
//!
//! The cursor owns the current position (block, exercise, set, round)
//! plus the session clock (start timestamp, accumulated pause time).
//! Advancing and retreating are exact mirrors: any position reachable by
//! a sequence of `advance` calls is restored by the same number of
//! `retreat` calls.
//!
//! Single-writer: the cursor is mutated from one logical task at a time.
//! All time-dependent operations take `now` explicitly so tests can
//! drive the clock deterministically.

use crate::types::{Block, BlockKind, Card};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Stable identity of one executable step, used to key performance
/// records. `round` is 1-based; `set` is the set index within the
/// exercise for simple blocks and always 0 for method blocks (where the
/// round carries the repetition).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepKey {
    pub block: usize,
    pub exercise: usize,
    pub set: usize,
    pub round: usize,
}

/// How a block is traversed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Traversal {
    /// Exercise by exercise, set by set
    Simple,
    /// All exercises back-to-back, repeated for `global_sets` rounds
    Method,
    /// One step for the whole block
    SingleStep,
}

fn traversal(block: &Block) -> Traversal {
    match block.kind {
        BlockKind::Simple => {
            // A simple block with no exercises cannot loop; treat it as
            // a single step so a shrunken plan still advances cleanly.
            if block.exercises.is_empty() {
                Traversal::SingleStep
            } else {
                Traversal::Simple
            }
        }
        BlockKind::Method { .. } => {
            if block.exercises.is_empty() {
                Traversal::SingleStep
            } else {
                Traversal::Method
            }
        }
        BlockKind::CustomMethod { .. } | BlockKind::Rest => Traversal::SingleStep,
    }
}

/// Set count for an exercise of a block, clamped for out-of-range indices
fn sets_in(block: &Block, exercise_index: usize) -> usize {
    block
        .exercises
        .get(exercise_index)
        .map(|e| e.sets.len())
        .unwrap_or(0)
}

/// Total number of executable steps in a card, as the cursor counts them
pub fn total_steps(card: &Card) -> usize {
    card.blocks
        .iter()
        .map(|block| match traversal(block) {
            Traversal::Simple => block.exercises.iter().map(|e| e.sets.len().max(1)).sum(),
            Traversal::Method => block.exercises.len() * block.global_sets.max(1) as usize,
            Traversal::SingleStep => 1,
        })
        .sum()
}

/// Traversal state for one workout session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionCursor {
    pub block_index: usize,
    pub exercise_index: usize,
    pub method_exercise_index: usize,
    pub set_index: usize,
    completed: bool,
    paused: bool,
    pause_start: Option<DateTime<Utc>>,
    accumulated_pause: Duration,
    start_timestamp: DateTime<Utc>,
}

impl SessionCursor {
    /// Cursor at the first step of the plan
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            block_index: 0,
            exercise_index: 0,
            method_exercise_index: 0,
            set_index: 0,
            completed: false,
            paused: false,
            pause_start: None,
            accumulated_pause: Duration::zero(),
            start_timestamp: started_at,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.start_timestamp
    }

    /// True at the very first step of the plan
    pub fn is_at_start(&self) -> bool {
        !self.completed
            && self.block_index == 0
            && self.exercise_index == 0
            && self.method_exercise_index == 0
            && self.set_index == 0
    }

    /// Identity of the current step, `None` once the session completed
    pub fn step_key(&self, card: &Card) -> Option<StepKey> {
        if self.completed {
            return None;
        }
        let block = card.blocks.get(self.block_index)?;
        let key = match traversal(block) {
            Traversal::Simple => StepKey {
                block: self.block_index,
                exercise: self.exercise_index,
                set: self.set_index,
                round: 1,
            },
            Traversal::Method => StepKey {
                block: self.block_index,
                exercise: self.method_exercise_index,
                set: 0,
                round: self.set_index + 1,
            },
            Traversal::SingleStep => StepKey {
                block: self.block_index,
                exercise: 0,
                set: 0,
                round: 1,
            },
        };
        Some(key)
    }

    fn reset_inner(&mut self) {
        self.exercise_index = 0;
        self.method_exercise_index = 0;
        self.set_index = 0;
    }

    fn advance_block(&mut self, card: &Card) {
        self.block_index += 1;
        self.reset_inner();
        if self.block_index >= card.blocks.len() {
            self.completed = true;
            tracing::info!("session completed after block {}", self.block_index);
        }
    }

    /// Move to the next step. No-op once the session is completed.
    pub fn advance(&mut self, card: &Card) {
        if self.completed {
            return;
        }
        let block = match card.blocks.get(self.block_index) {
            Some(block) => block,
            None => {
                // Plan shrank under us; clamp into the terminal state
                self.completed = true;
                return;
            }
        };

        match traversal(block) {
            Traversal::Simple => {
                let set_count = sets_in(block, self.exercise_index);
                if self.set_index + 1 < set_count {
                    self.set_index += 1;
                } else {
                    self.set_index = 0;
                    if self.exercise_index + 1 < block.exercises.len() {
                        self.exercise_index += 1;
                    } else {
                        self.advance_block(card);
                    }
                }
            }
            Traversal::Method => {
                // Exercises within a round happen back-to-back
                if self.method_exercise_index + 1 < block.exercises.len() {
                    self.method_exercise_index += 1;
                } else {
                    self.method_exercise_index = 0;
                    let rounds = block.global_sets.max(1) as usize;
                    if self.set_index + 1 < rounds {
                        self.set_index += 1;
                    } else {
                        self.advance_block(card);
                    }
                }
            }
            Traversal::SingleStep => self.advance_block(card),
        }
    }

    /// Position the inner indices at the last segment of `block`
    fn enter_block_from_end(&mut self, block: &Block) {
        self.reset_inner();
        match traversal(block) {
            Traversal::Simple => {
                self.exercise_index = block.exercises.len().saturating_sub(1);
                self.set_index = sets_in(block, self.exercise_index).saturating_sub(1);
            }
            Traversal::Method => {
                self.method_exercise_index = block.exercises.len().saturating_sub(1);
                self.set_index = (block.global_sets.max(1) as usize).saturating_sub(1);
            }
            Traversal::SingleStep => {}
        }
    }

    fn retreat_block(&mut self, card: &Card) {
        if self.block_index == 0 {
            return;
        }
        self.block_index -= 1;
        if let Some(block) = card.blocks.get(self.block_index) {
            self.enter_block_from_end(block);
        } else {
            self.reset_inner();
        }
    }

    /// Move to the previous step, the exact mirror of `advance`.
    /// No-op at the very first step of the plan.
    pub fn retreat(&mut self, card: &Card) {
        if self.completed {
            // Step back into the last step of the last block
            self.completed = false;
            self.block_index = card.blocks.len().saturating_sub(1);
            if let Some(block) = card.blocks.get(self.block_index) {
                self.enter_block_from_end(block);
            } else {
                self.reset_inner();
            }
            return;
        }
        if self.is_at_start() {
            return;
        }
        let block = match card.blocks.get(self.block_index) {
            Some(block) => block,
            None => {
                self.retreat_block(card);
                return;
            }
        };

        match traversal(block) {
            Traversal::Simple => {
                if self.set_index > 0 {
                    self.set_index -= 1;
                } else if self.exercise_index > 0 {
                    self.exercise_index -= 1;
                    self.set_index = sets_in(block, self.exercise_index).saturating_sub(1);
                } else {
                    self.retreat_block(card);
                }
            }
            Traversal::Method => {
                if self.method_exercise_index > 0 {
                    self.method_exercise_index -= 1;
                } else if self.set_index > 0 {
                    self.set_index -= 1;
                    self.method_exercise_index = block.exercises.len().saturating_sub(1);
                } else {
                    self.retreat_block(card);
                }
            }
            Traversal::SingleStep => self.retreat_block(card),
        }
    }

    /// Record the start of a pause. No-op if already paused.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.pause_start = Some(now);
        tracing::debug!("session paused at {now}");
    }

    /// Fold the in-progress pause into the accumulated offset and resume.
    /// No-op if not paused.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if !self.paused {
            return;
        }
        if let Some(pause_start) = self.pause_start.take() {
            self.accumulated_pause += now - pause_start;
        }
        self.paused = false;
        tracing::debug!("session resumed at {now}");
    }

    /// Active training time: wall time since start minus every pause,
    /// including an in-progress one. Never negative.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let mut elapsed = now - self.start_timestamp - self.accumulated_pause;
        if self.paused {
            if let Some(pause_start) = self.pause_start {
                elapsed = elapsed - (now - pause_start);
            }
        }
        elapsed.max(Duration::zero())
    }
}

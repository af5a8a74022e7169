#![forbid(unsafe_code)]

//! Core domain model and execution engine for Ghisa workout sessions.
//!
//! This crate provides:
//! - Plan model types (cards, blocks, exercises, sets) and validation
//! - Load resolution (percentage-of-max, cluster curves, custom methods)
//! - The session cursor state machine
//! - The phase timer engine (countdown, tabata, EMOM, AMRAP, circuit)
//! - Performance recording and session aggregates

pub mod types;
pub mod error;
pub mod plan;
pub mod loads;
pub mod library;
pub mod cursor;
pub mod timer;
pub mod recorder;
pub mod notify;
pub mod trace;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use catalog::{demo_card, demo_library, demo_one_rep_maxes};
pub use cursor::{total_steps, SessionCursor, StepKey};
pub use engine::{SessionSummary, StepInfo, WorkoutSession};
pub use library::{ExerciseLibrary, InMemoryExerciseLibrary, OneRepMaxProvider, StaticOneRepMax};
pub use loads::{cluster_count, cluster_load_curve, custom_method_rep_groups, resolve_percentage, resolve_weight};
pub use notify::{NotificationRequest, NotificationSink, NullSink, RecordingSink};
pub use recorder::{ExerciseSummary, ObservedValues, PerformanceLog, PerformanceRecord};
pub use timer::{PhaseTimer, RunState, TimerMode, TimerPhase, TimerSnapshot};
pub use trace::execution_trace;

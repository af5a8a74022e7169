//! Phase timer engine: one generic interval timer, five protocol modes.
//!
//! Remaining time is recomputed from wall-clock timestamps, never from
//! accumulated tick counts. When the host process is suspended for an
//! arbitrary interval, the next `tick` walks through every phase that
//! expired in the meantime, so the timer self-corrects instead of
//! stalling. Each phase is anchored at the instant the previous phase
//! would have expired, so overshoot carries over exactly.
//!
//! All time-dependent operations take `now` explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Protocol configuration for the timer
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimerMode {
    /// Single countdown, e.g. a rest period
    Countdown { seconds: u32 },
    /// Alternating work/rest across a fixed round count
    Tabata {
        work_seconds: u32,
        rest_seconds: u32,
        rounds: u32,
    },
    /// A fresh interval every `interval_seconds`, `rounds` times
    Emom { interval_seconds: u32, rounds: u32 },
    /// One window, as many reps as possible
    Amrap { total_seconds: u32 },
    /// Same toggling rule as tabata, station-based
    Circuit {
        work_seconds: u32,
        rest_seconds: u32,
        rounds: u32,
    },
}

impl TimerMode {
    /// Duration of the first phase
    pub fn initial_seconds(&self) -> u32 {
        match self {
            TimerMode::Countdown { seconds } => *seconds,
            TimerMode::Tabata { work_seconds, .. } => *work_seconds,
            TimerMode::Emom { interval_seconds, .. } => *interval_seconds,
            TimerMode::Amrap { total_seconds } => *total_seconds,
            TimerMode::Circuit { work_seconds, .. } => *work_seconds,
        }
    }

    /// Configured round count; single-countdown modes count as one round
    pub fn rounds(&self) -> u32 {
        match self {
            TimerMode::Countdown { .. } | TimerMode::Amrap { .. } => 1,
            TimerMode::Tabata { rounds, .. }
            | TimerMode::Emom { rounds, .. }
            | TimerMode::Circuit { rounds, .. } => (*rounds).max(1),
        }
    }
}

/// Mode-specific phase tag
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    Work,
    Rest,
    Completed,
}

/// Run state of the timer finite-state machine
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Stopped,
    Running,
    Paused,
}

/// Point-in-time view for the UI's periodic poll
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimerSnapshot {
    pub run_state: RunState,
    pub phase: TimerPhase,
    pub round: u32,
    pub remaining_seconds: f64,
}

/// The interval timer. Round counters stay within `1..=mode.rounds()`.
#[derive(Clone, Debug)]
pub struct PhaseTimer {
    mode: TimerMode,
    run_state: RunState,
    phase: TimerPhase,
    round: u32,
    /// Duration of the phase currently in flight
    phase_seconds: f64,
    /// Wall-clock anchor of the current phase while running
    phase_started: Option<DateTime<Utc>>,
    /// Remaining time captured when not running
    remaining: f64,
}

impl PhaseTimer {
    pub fn new(mode: TimerMode) -> Self {
        let initial = mode.initial_seconds() as f64;
        Self {
            mode,
            run_state: RunState::Stopped,
            phase: TimerPhase::Work,
            round: 1,
            phase_seconds: initial,
            phase_started: None,
            remaining: initial,
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn current_round(&self) -> u32 {
        self.round
    }

    /// Swap in a new mode: stops any in-flight run and resets rounds to 1
    pub fn update(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.stop();
    }

    /// Reset to the mode's initial phase and duration; idempotent
    pub fn stop(&mut self) {
        self.run_state = RunState::Stopped;
        self.phase = TimerPhase::Work;
        self.round = 1;
        self.phase_seconds = self.mode.initial_seconds() as f64;
        self.remaining = self.phase_seconds;
        self.phase_started = None;
    }

    /// Begin running from the stopped state. No-op while running or paused.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.run_state != RunState::Stopped || self.phase == TimerPhase::Completed {
            return;
        }
        self.phase_started = Some(now);
        self.run_state = RunState::Running;
        tracing::debug!(mode = ?self.mode, "timer started");
    }

    /// Freeze the remaining time; idempotent
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.run_state != RunState::Running {
            return;
        }
        self.remaining = self.raw_remaining(now).max(0.0);
        self.phase_started = None;
        self.run_state = RunState::Paused;
    }

    /// Re-anchor the current phase and continue; idempotent
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if self.run_state != RunState::Paused {
            return;
        }
        let consumed = self.phase_seconds - self.remaining;
        self.phase_started = Some(now - chrono::Duration::milliseconds((consumed * 1000.0) as i64));
        self.run_state = RunState::Running;
    }

    fn raw_remaining(&self, now: DateTime<Utc>) -> f64 {
        match self.phase_started {
            Some(started) => {
                let elapsed = (now - started).num_milliseconds() as f64 / 1000.0;
                self.phase_seconds - elapsed
            }
            None => self.remaining,
        }
    }

    /// Periodic callback: recompute remaining time and apply as many
    /// phase advances as have expired by `now`.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TimerSnapshot {
        if self.run_state == RunState::Running {
            // Walk through every phase boundary passed since the anchor,
            // carrying overshoot into the next phase.
            while self.run_state == RunState::Running && self.raw_remaining(now) <= 0.0 {
                self.advance_phase();
            }
        }
        self.snapshot(now)
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> TimerSnapshot {
        let remaining = match self.run_state {
            RunState::Running => self.raw_remaining(now).max(0.0),
            _ => self.remaining,
        };
        TimerSnapshot {
            run_state: self.run_state,
            phase: self.phase,
            round: self.round,
            remaining_seconds: remaining,
        }
    }

    fn complete(&mut self) {
        self.phase = TimerPhase::Completed;
        self.run_state = RunState::Stopped;
        self.phase_started = None;
        self.remaining = 0.0;
        tracing::debug!(mode = ?self.mode, round = self.round, "timer completed");
    }

    /// Re-anchor the next phase at the expiry instant of the current one
    fn begin_phase(&mut self, phase: TimerPhase, seconds: f64) {
        self.phase_started = self.phase_started.map(|started| {
            started + chrono::Duration::milliseconds((self.phase_seconds * 1000.0) as i64)
        });
        self.phase = phase;
        self.phase_seconds = seconds;
    }

    /// Mode-specific phase-advance rule applied on expiry
    fn advance_phase(&mut self) {
        match self.mode {
            TimerMode::Countdown { .. } | TimerMode::Amrap { .. } => self.complete(),
            TimerMode::Tabata {
                work_seconds,
                rest_seconds,
                ..
            }
            | TimerMode::Circuit {
                work_seconds,
                rest_seconds,
                ..
            } => match self.phase {
                TimerPhase::Work => {
                    self.begin_phase(TimerPhase::Rest, rest_seconds as f64);
                }
                TimerPhase::Rest => {
                    if self.round >= self.mode.rounds() {
                        self.complete();
                    } else {
                        self.round += 1;
                        self.begin_phase(TimerPhase::Work, work_seconds as f64);
                    }
                }
                TimerPhase::Completed => self.complete(),
            },
            TimerMode::Emom {
                interval_seconds, ..
            } => {
                if self.round >= self.mode.rounds() {
                    self.complete();
                } else {
                    self.round += 1;
                    self.begin_phase(TimerPhase::Work, interval_seconds as f64);
                }
            }
        }
    }
}

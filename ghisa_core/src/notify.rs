//! Notification scheduling decisions.
//!
//! The engine never delivers notifications itself: on starting a
//! countdown-style phase it emits a scheduling request through the sink,
//! and on pause/stop it emits a cancellation for the same fixed
//! identifier. Delivery mechanics belong to the host.

use crate::timer::TimerMode;
use serde::{Deserialize, Serialize};

/// Fixed identifier all phase notifications are scheduled under
pub const TIMER_NOTIFICATION_ID: &str = "ghisa.timer.phase";

/// Which entry of the content table to use
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Rest,
    Tabata,
    Emom,
    Amrap,
    Cluster,
    Generic,
}

impl NotificationKind {
    /// Default content entry for a timer mode. Countdowns default to
    /// rest; the engine picks `Cluster` explicitly for intra-set pauses.
    pub fn for_mode(mode: &TimerMode) -> Self {
        match mode {
            TimerMode::Countdown { .. } => NotificationKind::Rest,
            TimerMode::Tabata { .. } => NotificationKind::Tabata,
            TimerMode::Emom { .. } => NotificationKind::Emom,
            TimerMode::Amrap { .. } => NotificationKind::Amrap,
            TimerMode::Circuit { .. } => NotificationKind::Generic,
        }
    }

    fn content(&self) -> (&'static str, &'static str) {
        match self {
            NotificationKind::Rest => ("Riposo terminato", "Torna sotto il bilanciere"),
            NotificationKind::Tabata => ("Tabata", "Cambio fase, continua così"),
            NotificationKind::Emom => ("EMOM", "Nuovo minuto, si riparte"),
            NotificationKind::Amrap => ("AMRAP", "Tempo scaduto"),
            NotificationKind::Cluster => ("Cluster", "Pausa finita, prossimo mini-set"),
            NotificationKind::Generic => ("Allenamento", "Prossimo passo"),
        }
    }
}

/// A request to schedule one local notification
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NotificationRequest {
    pub identifier: String,
    pub title: String,
    pub body: String,
    pub fire_after_seconds: f64,
}

/// Build the scheduling request for a phase of the given kind
pub fn request_for(kind: NotificationKind, fire_after_seconds: f64) -> NotificationRequest {
    let (title, body) = kind.content();
    NotificationRequest {
        identifier: TIMER_NOTIFICATION_ID.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        fire_after_seconds,
    }
}

/// External delivery sink, implemented by the host
pub trait NotificationSink {
    fn schedule(&mut self, request: NotificationRequest);
    fn cancel(&mut self, identifier: &str);
}

/// Sink that drops every request, for headless runs
#[derive(Clone, Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn schedule(&mut self, _request: NotificationRequest) {}
    fn cancel(&mut self, _identifier: &str) {}
}

/// Sink that records every call, for tests. Clones share the same
/// backing storage so a test can keep a handle while the engine owns
/// the sink.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    scheduled: std::sync::Arc<std::sync::Mutex<Vec<NotificationRequest>>>,
    cancelled: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&self) -> Vec<NotificationRequest> {
        self.scheduled.lock().expect("sink lock poisoned").clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().expect("sink lock poisoned").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn schedule(&mut self, request: NotificationRequest) {
        self.scheduled.lock().expect("sink lock poisoned").push(request);
    }

    fn cancel(&mut self, identifier: &str) {
        self.cancelled
            .lock()
            .expect("sink lock poisoned")
            .push(identifier.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_per_mode() {
        assert_eq!(
            NotificationKind::for_mode(&TimerMode::Countdown { seconds: 90 }),
            NotificationKind::Rest
        );
        assert_eq!(
            NotificationKind::for_mode(&TimerMode::Amrap { total_seconds: 300 }),
            NotificationKind::Amrap
        );
        assert_eq!(
            NotificationKind::for_mode(&TimerMode::Emom {
                interval_seconds: 60,
                rounds: 5
            }),
            NotificationKind::Emom
        );
    }

    #[test]
    fn test_requests_share_the_fixed_identifier() {
        for kind in [
            NotificationKind::Rest,
            NotificationKind::Tabata,
            NotificationKind::Emom,
            NotificationKind::Amrap,
            NotificationKind::Cluster,
            NotificationKind::Generic,
        ] {
            let request = request_for(kind, 30.0);
            assert_eq!(request.identifier, TIMER_NOTIFICATION_ID);
            assert!(!request.title.is_empty());
            assert!(!request.body.is_empty());
        }
    }

    #[test]
    fn test_recording_sink_shares_state_across_clones() {
        let handle = RecordingSink::new();
        let mut sink = handle.clone();
        sink.schedule(request_for(NotificationKind::Rest, 90.0));
        sink.cancel(TIMER_NOTIFICATION_ID);

        assert_eq!(handle.scheduled().len(), 1);
        assert_eq!(handle.scheduled()[0].fire_after_seconds, 90.0);
        assert_eq!(handle.cancelled(), vec![TIMER_NOTIFICATION_ID.to_string()]);
    }
}

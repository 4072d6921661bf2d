//! Stable `Reason` strings and the `EventRecorder` trait (spec §6.6).
//!
//! The surrounding runtime's event recorder (e.g. a Kubernetes Event
//! sink) is an external collaborator, so the core crate only defines the
//! trait and a logging-backed default, the same split the teacher uses
//! for `TelemetrySink` (trait) vs. `LogSink` (default impl).

/// Stable reason strings attached to recorded events; never renamed once
/// shipped (spec §6 treats these as part of the wire contract).
pub mod reason {
    pub const RECONCILE_STARTED: &str = "ReconcileStarted";
    pub const PHASE_TRANSITION: &str = "PhaseTransition";
    pub const NOTIFICATION_SENT: &str = "NotificationSent";
    pub const NOTIFICATION_RETRYING: &str = "NotificationRetrying";
    pub const NOTIFICATION_PARTIALLY_SENT: &str = "NotificationPartiallySent";
    pub const NOTIFICATION_FAILED: &str = "NotificationFailed";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Normal,
    Warning,
}

pub trait EventRecorder: Send + Sync {
    fn record(&self, key: &str, event_type: EventType, reason: &str, message: &str);
}

pub struct TracingEventRecorder;

impl EventRecorder for TracingEventRecorder {
    fn record(&self, key: &str, event_type: EventType, reason: &str, message: &str) {
        match event_type {
            EventType::Normal => tracing::info!(request = key, reason, "{message}"),
            EventType::Warning => tracing::warn!(request = key, reason, "{message}"),
        }
    }
}

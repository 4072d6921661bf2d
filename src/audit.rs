//! C6: Audit Emitter. Fire-and-forget emission of structured audit
//! events (spec §4.6), never blocking the reconcile loop on the sink.
//!
//! Grounded directly on the teacher's `NonBlockingSink<S>`
//! (`examples/flyingrobots-ninelives/src/telemetry/sinks.rs`): a bounded
//! mpsc channel feeding a background worker, with a dropped-event counter
//! instead of back-pressure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

pub const RETENTION_DAYS: u32 = 2555;

/// Schema matches spec §4.6.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEvent {
    pub event_type: String,
    pub event_category: String,
    pub event_action: String,
    pub event_outcome: String,
    pub actor_type: String,
    pub actor_id: String,
    pub resource_type: String,
    pub resource_id: String,
    pub correlation_id: Option<String>,
    pub event_timestamp: String,
    pub event_data: serde_json::Value,
    pub retention_days: u32,
}

/// Anything that can durably accept a batch of audit events. Implemented
/// out-of-process (the HTTP audit store is a satellite crate); the core
/// crate only defines the trait and the in-process buffering in front of
/// it, matching how the teacher treats `TelemetrySink` as a trait with a
/// logging-backed default.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn submit(&self, events: Vec<AuditEvent>) -> Result<(), String>;
}

/// Logs events instead of shipping them anywhere; the default store when
/// no external `AuditStore` is configured.
pub struct LoggingAuditStore;

#[async_trait]
impl AuditStore for LoggingAuditStore {
    async fn submit(&self, events: Vec<AuditEvent>) -> Result<(), String> {
        for event in &events {
            tracing::info!(
                event_type = %event.event_type,
                event_action = %event.event_action,
                event_outcome = %event.event_outcome,
                resource_id = %event.resource_id,
                "audit event"
            );
        }
        Ok(())
    }
}

/// Non-blocking emitter: `record` never awaits the sink. Events queue on a
/// bounded channel and a background task flushes them to the configured
/// `AuditStore`; once the channel is full, new events are dropped and
/// counted rather than applying back-pressure to the reconcile loop.
pub struct BufferedAuditEmitter {
    sender: mpsc::Sender<AuditEvent>,
    dropped: Arc<AtomicU64>,
}

impl BufferedAuditEmitter {
    pub fn new(store: Arc<dyn AuditStore>, capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<AuditEvent>(capacity);
        let dropped = Arc::new(AtomicU64::new(0));

        tokio::spawn(async move {
            let mut batch = Vec::with_capacity(32);
            while let Some(event) = receiver.recv().await {
                batch.push(event);
                // Drain whatever else is immediately available so a burst
                // becomes one submit() call instead of many.
                while let Ok(event) = receiver.try_recv() {
                    batch.push(event);
                }
                if let Err(e) = store.submit(std::mem::take(&mut batch)).await {
                    tracing::warn!(error = %e, "audit store submit failed");
                }
            }
        });

        Self { sender, dropped }
    }

    /// Enqueues an event without waiting. Returns immediately even if the
    /// channel is full (the event is dropped and `dropped_count` grows).
    pub fn record(&self, event: AuditEvent) {
        if self.sender.try_send(event).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            tracing::warn!("audit channel full, dropping event");
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CollectingStore {
        received: Mutex<Vec<AuditEvent>>,
    }

    #[async_trait]
    impl AuditStore for CollectingStore {
        async fn submit(&self, events: Vec<AuditEvent>) -> Result<(), String> {
            self.received.lock().unwrap().extend(events);
            Ok(())
        }
    }

    fn sample_event(resource_id: &str) -> AuditEvent {
        AuditEvent {
            event_type: "notification.delivery".into(),
            event_category: "delivery".into(),
            event_action: "deliver".into(),
            event_outcome: "success".into(),
            actor_type: "controller".into(),
            actor_id: "notifyctl".into(),
            resource_type: "NotificationRequest".into(),
            resource_id: resource_id.into(),
            correlation_id: None,
            event_timestamp: "2026-07-31T00:00:00Z".into(),
            event_data: serde_json::json!({}),
            retention_days: RETENTION_DAYS,
        }
    }

    #[tokio::test]
    async fn emitted_events_reach_the_store() {
        let store = Arc::new(CollectingStore { received: Mutex::new(Vec::new()) });
        let emitter = BufferedAuditEmitter::new(store.clone(), 16);
        emitter.record(sample_event("req-1"));
        emitter.record(sample_event("req-2"));

        for _ in 0..50 {
            if store.received.lock().unwrap().len() == 2 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(store.received.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn full_channel_drops_and_counts_instead_of_blocking() {
        struct SlowStore;
        #[async_trait]
        impl AuditStore for SlowStore {
            async fn submit(&self, _events: Vec<AuditEvent>) -> Result<(), String> {
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                Ok(())
            }
        }
        let emitter = BufferedAuditEmitter::new(Arc::new(SlowStore), 1);
        for i in 0..20 {
            emitter.record(sample_event(&format!("req-{i}")));
        }
        assert!(emitter.dropped_count() > 0);
    }
}

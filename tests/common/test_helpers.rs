use async_trait::async_trait;
use notifyctl::prelude::{AuditEvent, AuditStore, DeliveryError, DeliveryService, OutgoingMessage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A delivery service scripted to fail with a given HTTP status some
/// number of times before succeeding. Lets a test assert exact attempt
/// counts without depending on wall-clock timing.
pub struct ScriptedDeliveryService {
    key: String,
    status: u16,
    remaining_failures: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedDeliveryService {
    pub fn new(key: impl Into<String>, status: u16, fail_times: usize) -> Self {
        Self {
            key: key.into(),
            status,
            remaining_failures: AtomicUsize::new(fail_times),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeliveryService for ScriptedDeliveryService {
    fn channel_key(&self) -> String {
        self.key.clone()
    }

    async fn deliver(&self, _message: &OutgoingMessage) -> Result<(), DeliveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::SeqCst);
            return Err(DeliveryError::Http { status: self.status, message: "scripted failure".into() });
        }
        Ok(())
    }
}

/// In-memory [`notifyctl::AuditStore`] that just records everything
/// submitted, for assertions on audit correlation.
#[derive(Default)]
pub struct CollectingAuditStore {
    pub events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditStore for CollectingAuditStore {
    async fn submit(&self, events: Vec<AuditEvent>) -> Result<(), String> {
        self.events.lock().unwrap().extend(events);
        Ok(())
    }
}

//! The declarative resource registry's read/write surface, as seen from
//! inside the controller (the registry itself is out of scope per spec
//! §1; this trait is the boundary the reconciler reads/writes through).
//!
//! Grounded directly on the teacher's `TokenStore` CAS pattern
//! (`examples/flyingrobots-ninelives/src/rate_limit/store.rs`):
//! `compare_and_set_status` takes the generation the reconciler last
//! observed and rejects the write if the stored generation has moved on,
//! exactly as `set_state` rejects on a mismatched `prev_updated_at`.

use crate::error::RegistryError;
use crate::types::{NotificationRequest, NotificationRequestStatus};
use async_trait::async_trait;

#[async_trait]
pub trait RequestRegistry: Send + Sync {
    async fn get(&self, key: &str) -> Result<NotificationRequest, RegistryError>;

    /// Writes `status` for `key`, succeeding only if the request's stored
    /// generation still equals `expected_generation`. Returns
    /// `Err(RegistryError::Conflict)` if it does not (spec I6: status
    /// writes must be optimistic-concurrency protected).
    async fn compare_and_set_status(
        &self,
        key: &str,
        expected_generation: u64,
        status: NotificationRequestStatus,
    ) -> Result<(), RegistryError>;

    async fn list_keys(&self) -> Vec<String>;
}

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryRequestRegistry {
    data: Mutex<HashMap<String, NotificationRequest>>,
}

impl InMemoryRequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, request: NotificationRequest) {
        self.data.lock().unwrap_or_else(|p| p.into_inner()).insert(request.name.clone(), request);
    }
}

#[async_trait]
impl RequestRegistry for InMemoryRequestRegistry {
    async fn get(&self, key: &str) -> Result<NotificationRequest, RegistryError> {
        self.data
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))
    }

    async fn compare_and_set_status(
        &self,
        key: &str,
        expected_generation: u64,
        status: NotificationRequestStatus,
    ) -> Result<(), RegistryError> {
        let mut guard = self.data.lock().unwrap_or_else(|p| p.into_inner());
        let request = guard.get_mut(key).ok_or_else(|| RegistryError::NotFound(key.to_string()))?;
        if request.generation != expected_generation {
            return Err(RegistryError::Conflict(key.to_string()));
        }
        request.status = status;
        Ok(())
    }

    async fn list_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.lock().unwrap_or_else(|p| p.into_inner()).keys().cloned().collect();
        keys.sort();
        keys
    }
}

//! HTTP-backed [`notifyctl::audit::AuditStore`]: POSTs batches of audit
//! events to an external collector's `/audit/events` endpoint (spec §6.6).
//!
//! Bring your own [`reqwest::Client`], same shape as the teacher's
//! `ninelives-elastic` bringing its own `elasticsearch::Elasticsearch`.

use async_trait::async_trait;
use notifyctl::prelude::{AuditEvent, AuditStore};

/// Ships audit events to `{base_url}/audit/events` as a JSON array.
#[derive(Clone, Debug)]
pub struct HttpAuditStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAuditStore {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self { base_url: base_url.into(), client }
    }
}

#[async_trait]
impl AuditStore for HttpAuditStore {
    async fn submit(&self, events: Vec<AuditEvent>) -> Result<(), String> {
        if events.is_empty() {
            return Ok(());
        }
        let url = format!("{}/audit/events", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&events)
            .send()
            .await
            .map_err(|e| format!("audit submit failed: {e}"))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("audit collector returned {}", response.status()))
        }
    }
}

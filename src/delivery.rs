//! The pluggable delivery plugin interface (spec §6.2): anything that can
//! take a sanitized message and a recipient and attempt to send it.

use crate::error::DeliveryError;
use crate::types::Recipient;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// A single sanitized message ready to hand to a channel's delivery
/// service. Subject/body/metadata have already passed through the
/// sanitizer (C1) by the time the orchestrator builds this.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<Recipient>,
    pub metadata: BTreeMap<String, String>,
}

/// Implemented once per channel (console, slack-webhook, generic webhook,
/// ...). Mirrors the control plane's `CommandHandler` async-trait shape:
/// a single `deliver` entry point the orchestrator calls uniformly.
#[async_trait]
pub trait DeliveryService: Send + Sync {
    /// Stable identifier used for circuit breaker keying and audit
    /// correlation, e.g. `"console"`, `"slack:#ops"`.
    fn channel_key(&self) -> String;

    async fn deliver(&self, message: &OutgoingMessage) -> Result<(), DeliveryError>;
}

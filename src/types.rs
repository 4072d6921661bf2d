//! Data model: `NotificationRequest` and the types it is built from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A declarative request to deliver a notification across one or more
/// channels. Mirrors a Kubernetes-style spec/status split: `spec` is
/// supplied by the caller and immutable after creation (barring the fields
/// §4.7.3 allows to change); `status` is owned by the reconciler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationRequest {
    pub name: String,
    pub generation: u64,
    pub spec: NotificationRequestSpec,
    #[serde(default)]
    pub status: NotificationRequestStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationRequestSpec {
    #[serde(rename = "type")]
    pub notification_type: String,
    #[serde(default)]
    pub priority: Priority,
    pub subject: String,
    pub body: String,
    pub recipients: Vec<Recipient>,
    /// Channel keys this request wants delivered to. Empty means "let
    /// routing decide" (spec §6.4); non-empty is an explicit override.
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub action_links: Vec<ActionLink>,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recipient {
    Email { address: String },
    Slack { channel: String },
    Console,
    WebhookUrl { url: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionLink {
    pub label: String,
    pub url: String,
}

/// Bounded, validated retry configuration (spec §3, field ranges enforced
/// at construction).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_seconds: u32,
    pub backoff_multiplier: u32,
    pub max_backoff_seconds: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_seconds: 30,
            backoff_multiplier: 2,
            max_backoff_seconds: 480,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("retry policy field {field} out of range: {value} (allowed: {allowed})")]
pub struct RetryPolicyValidationError {
    pub field: &'static str,
    pub value: u32,
    pub allowed: &'static str,
}

impl RetryPolicy {
    pub fn validate(&self) -> Result<(), RetryPolicyValidationError> {
        if !(1..=10).contains(&self.max_attempts) {
            return Err(RetryPolicyValidationError {
                field: "maxAttempts",
                value: self.max_attempts,
                allowed: "1..=10",
            });
        }
        if self.initial_backoff_seconds < 1 {
            return Err(RetryPolicyValidationError {
                field: "initialBackoffSeconds",
                value: self.initial_backoff_seconds,
                allowed: ">=1",
            });
        }
        if self.backoff_multiplier < 1 {
            return Err(RetryPolicyValidationError {
                field: "backoffMultiplier",
                value: self.backoff_multiplier,
                allowed: ">=1",
            });
        }
        if self.max_backoff_seconds < 60 {
            return Err(RetryPolicyValidationError {
                field: "maxBackoffSeconds",
                value: self.max_backoff_seconds,
                allowed: ">=60",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NotificationRequestStatus {
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total_attempts: u32,
    #[serde(default)]
    pub successful_deliveries: Vec<String>,
    #[serde(default)]
    pub failed_deliveries: Vec<String>,
    #[serde(default)]
    pub delivery_attempts: Vec<DeliveryAttempt>,
    #[serde(default)]
    pub completion_time: Option<String>,
    #[serde(default)]
    pub observed_generation: u64,
}

/// Phase state machine (spec §4.7.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub enum Phase {
    #[default]
    Pending,
    InProgress,
    PartiallySent,
    Sent,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Sent | Phase::Failed | Phase::PartiallySent)
    }
}

/// Stable `status.reason` codes (spec §3, §4.7.1 step 6): part of the wire
/// contract, never renamed once shipped.
pub mod status_reason {
    pub const ALL_DELIVERIES_SUCCEEDED: &str = "AllDeliveriesSucceeded";
    pub const MAX_RETRIES_EXCEEDED: &str = "MaxRetriesExceeded";
    pub const PARTIAL_DELIVERY_FAILURE: &str = "PartialDeliveryFailure";
    pub const ALL_DELIVERIES_FAILED: &str = "AllDeliveriesFailed";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryAttempt {
    pub channel: String,
    pub attempt_number: u32,
    pub outcome: AttemptOutcome,
    pub timestamp: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    RetryableFailure,
    PermanentFailure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_retry_policy_is_valid() {
        assert!(RetryPolicy::default().validate().is_ok());
    }

    #[test]
    fn rejects_max_attempts_out_of_range() {
        let policy = RetryPolicy { max_attempts: 0, ..RetryPolicy::default() };
        assert!(policy.validate().is_err());
        let policy = RetryPolicy { max_attempts: 11, ..RetryPolicy::default() };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn rejects_max_backoff_below_floor() {
        let policy = RetryPolicy { max_backoff_seconds: 59, ..RetryPolicy::default() };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn phase_terminal_states() {
        assert!(Phase::Sent.is_terminal());
        assert!(Phase::Failed.is_terminal());
        assert!(Phase::PartiallySent.is_terminal());
        assert!(!Phase::InProgress.is_terminal());
        assert!(!Phase::Pending.is_terminal());
    }
}

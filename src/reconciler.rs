//! C7: Reconciler / Phase Engine. The dominant component. Implements the
//! fetch → terminal guard → select channels → determine pending → deliver
//! → compute phase → persist status → emit events → requeue loop.
//!
//! Grounded on the kube-rs reconciler shape
//! (`examples/other_examples/28fc308e_kube-rs-kube__kube-runtime-src-controller-mod.rs.rs`),
//! wired up with this crate's own `CircuitBreakerRegistry` and
//! `Adaptive`-backed routing/credential state.

use crate::adaptive::Adaptive;
use crate::audit::{AuditEvent, BufferedAuditEmitter, RETENTION_DAYS};
use crate::circuit_breaker_registry::CircuitBreakerRegistry;
use crate::classify::Classification;
use crate::delivery::{DeliveryService, OutgoingMessage};
use crate::error::{ReconcileError, RegistryError};
use crate::observability::{reason, EventRecorder, EventType};
use crate::orchestrator::{self, AttemptResult};
use crate::registry::RequestRegistry;
use crate::retry_schedule;
use crate::routing::RoutingConfig;
use crate::sanitizer;
use crate::types::{
    status_reason, AttemptOutcome, DeliveryAttempt, NotificationRequest, NotificationRequestStatus, Phase,
};

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// Bounded number of compare-and-set retries on a status-write conflict
/// (spec I6 / §4.7.4): a concurrent writer is expected to be rare, so a
/// small bound plus surfacing `ConflictRetryExhausted` is preferable to
/// retrying forever.
const MAX_CONFLICT_RETRIES: u32 = 3;

pub struct ReconcileOutcome {
    pub phase: Phase,
    /// `Some(duration)` tells the external runtime to requeue this key
    /// after the given delay (spec §5); `None` means the request reached
    /// a terminal phase and needs no further reconciliation.
    pub requeue_after: Option<Duration>,
}

pub struct Reconciler {
    registry: Arc<dyn RequestRegistry>,
    routing: Adaptive<RoutingConfig>,
    channels: HashMap<String, Arc<dyn DeliveryService>>,
    breakers: CircuitBreakerRegistry,
    audit: Arc<BufferedAuditEmitter>,
    events: Arc<dyn EventRecorder>,
}

impl Reconciler {
    pub fn new(
        registry: Arc<dyn RequestRegistry>,
        routing: Adaptive<RoutingConfig>,
        channels: HashMap<String, Arc<dyn DeliveryService>>,
        breakers: CircuitBreakerRegistry,
        audit: Arc<BufferedAuditEmitter>,
        events: Arc<dyn EventRecorder>,
    ) -> Self {
        Self { registry, routing, channels, breakers, audit, events }
    }

    pub async fn reconcile(&self, key: &str) -> Result<ReconcileOutcome, ReconcileError> {
        let request = match self.registry.get(key).await {
            Ok(request) => request,
            // Entity deleted mid-flight (spec §4.7.1 step 1, §7 item 6): not
            // an error, nothing left to reconcile.
            Err(RegistryError::NotFound(_)) => {
                return Ok(ReconcileOutcome { phase: Phase::Pending, requeue_after: None });
            }
            Err(e) => return Err(e.into()),
        };

        self.events.record(key, EventType::Normal, reason::RECONCILE_STARTED, "reconciliation started");

        let previous_phase = request.status.phase;

        if previous_phase.is_terminal() {
            if request.generation != request.status.observed_generation {
                return Err(ReconcileError::ImmutableFieldChanged {
                    field: "spec",
                    observed_generation: request.status.observed_generation,
                });
            }
            return Ok(ReconcileOutcome { phase: previous_phase, requeue_after: None });
        }

        let channels = self.select_channels(&request)?;
        let message = self.build_message(&request);

        let mut status = request.status.clone();
        status.observed_generation = request.generation;

        let mut next_delay: Option<Duration> = None;

        for channel in &channels {
            if status.successful_deliveries.contains(channel) || status.failed_deliveries.contains(channel) {
                continue;
            }

            let attempt_number = status
                .delivery_attempts
                .iter()
                .filter(|a| &a.channel == channel)
                .count() as u32
                + 1;

            let outcome = self.deliver_one(channel, &message).await;
            status.total_attempts += 1;

            let (record_outcome, reason_str, delay) =
                self.handle_attempt(&mut status, channel, attempt_number, &request, &outcome);

            status.delivery_attempts.push(DeliveryAttempt {
                channel: channel.clone(),
                attempt_number,
                outcome: record_outcome,
                timestamp: timestamp_placeholder(),
                reason: Some(reason_str.to_string()),
            });

            self.emit_audit(&request, channel, record_outcome, reason_str);

            if let Some(d) = delay {
                next_delay = Some(next_delay.map_or(d, |cur| cur.min(d)));
            }
        }

        let phase_outcome = compute_phase(&channels, &status);
        status.phase = phase_outcome.phase;
        status.reason = phase_outcome.reason.map(str::to_string);
        status.message = phase_outcome.message;
        if status.phase.is_terminal() {
            status.completion_time = Some(timestamp_placeholder());
            next_delay = None;
        }

        self.persist_status(key, request.generation, status.clone()).await?;

        if status.phase != previous_phase {
            self.events.record(
                key,
                EventType::Normal,
                reason::PHASE_TRANSITION,
                &format!("{previous_phase:?} -> {:?}", status.phase),
            );
        }

        if status.phase.is_terminal() {
            let terminal_reason = match status.phase {
                Phase::Sent => reason::NOTIFICATION_SENT,
                Phase::PartiallySent => reason::NOTIFICATION_PARTIALLY_SENT,
                Phase::Failed => reason::NOTIFICATION_FAILED,
                Phase::Pending | Phase::InProgress => unreachable!("terminal guard covers only terminal phases"),
            };
            self.events.record(key, EventType::Normal, terminal_reason, "reconciliation reached a terminal phase");
        }

        Ok(ReconcileOutcome { phase: status.phase, requeue_after: next_delay })
    }

    fn select_channels(&self, request: &NotificationRequest) -> Result<Vec<String>, ReconcileError> {
        let mut channels = if request.spec.channels.is_empty() {
            self.routing.get().select_channels(&request.spec.labels)
        } else {
            request.spec.channels.clone()
        };
        dedup_in_place(&mut channels);
        if channels.is_empty() {
            return Err(ReconcileError::NoChannelsSelected { key: request.name.clone() });
        }
        Ok(channels)
    }

    fn build_message(&self, request: &NotificationRequest) -> OutgoingMessage {
        OutgoingMessage {
            subject: sanitizer::sanitize(&request.spec.subject),
            body: sanitizer::sanitize(&request.spec.body),
            recipients: request.spec.recipients.clone(),
            metadata: sanitizer::sanitize_metadata(&request.spec.metadata),
        }
    }

    async fn deliver_one(&self, channel: &str, message: &OutgoingMessage) -> AttemptResult {
        let Some(service) = self.channels.get(channel).cloned() else {
            return AttemptResult::Failed {
                error: crate::error::DeliveryError::Transport(format!("no delivery service registered for channel {channel:?}")),
                classification: Classification::Permanent,
            };
        };
        let breaker = self.breakers.get_or_create(channel);
        orchestrator::attempt(&breaker, service, message.clone()).await
    }

    /// Applies one channel's outcome to `status`, returning the recorded
    /// attempt outcome, a stable reason string, and an optional requeue
    /// delay for this channel.
    fn handle_attempt(
        &self,
        status: &mut NotificationRequestStatus,
        channel: &str,
        attempt_number: u32,
        request: &NotificationRequest,
        outcome: &AttemptResult,
    ) -> (AttemptOutcome, &'static str, Option<Duration>) {
        match outcome {
            AttemptResult::Success => {
                status.successful_deliveries.push(channel.to_string());
                (AttemptOutcome::Success, reason::NOTIFICATION_SENT, None)
            }
            // Circuit-open attempts are retryable-category but still
            // subject to the scheduler's cap (spec §4.7.4): a permanently
            // tripped breaker must eventually let the channel reach
            // terminal-failed rather than requeue forever.
            AttemptResult::CircuitOpen { .. } => {
                if retry_schedule::should_retry(attempt_number, &request.spec.retry_policy) {
                    let delay = retry_schedule::next_delay(attempt_number, &request.spec.retry_policy);
                    (AttemptOutcome::RetryableFailure, reason::NOTIFICATION_RETRYING, Some(delay))
                } else {
                    status.failed_deliveries.push(channel.to_string());
                    (AttemptOutcome::RetryableFailure, reason::NOTIFICATION_FAILED, None)
                }
            }
            AttemptResult::Failed { classification: Classification::Permanent, .. } => {
                status.failed_deliveries.push(channel.to_string());
                (AttemptOutcome::PermanentFailure, reason::NOTIFICATION_FAILED, None)
            }
            AttemptResult::Failed { classification: Classification::Retryable, .. } => {
                if retry_schedule::should_retry(attempt_number, &request.spec.retry_policy) {
                    let delay = retry_schedule::next_delay(attempt_number, &request.spec.retry_policy);
                    (AttemptOutcome::RetryableFailure, reason::NOTIFICATION_RETRYING, Some(delay))
                } else {
                    status.failed_deliveries.push(channel.to_string());
                    (AttemptOutcome::RetryableFailure, reason::NOTIFICATION_FAILED, None)
                }
            }
        }
    }

    fn emit_audit(&self, request: &NotificationRequest, channel: &str, outcome: AttemptOutcome, reason_str: &str) {
        let correlation_id = request
            .spec
            .metadata
            .get("remediationRequestName")
            .cloned()
            .unwrap_or_else(|| request.name.clone());
        let (action, event_outcome) = match outcome {
            AttemptOutcome::Success => ("sent", "success"),
            AttemptOutcome::RetryableFailure => ("retrying", "failure"),
            AttemptOutcome::PermanentFailure => ("failed", "failure"),
        };
        self.audit.record(AuditEvent {
            event_type: format!("notification.message.{action}"),
            event_category: "notification".to_string(),
            event_action: action.to_string(),
            event_outcome: event_outcome.to_string(),
            actor_type: "service".to_string(),
            actor_id: "notification-controller".to_string(),
            resource_type: "NotificationRequest".to_string(),
            resource_id: request.name.clone(),
            correlation_id: Some(correlation_id),
            event_timestamp: timestamp_placeholder(),
            event_data: serde_json::json!({ "channel": channel, "reason": reason_str }),
            retention_days: RETENTION_DAYS,
        });

        let event_type = if matches!(outcome, AttemptOutcome::Success) { EventType::Normal } else { EventType::Warning };
        self.events.record(&request.name, event_type, reason_str, channel);
    }

    async fn persist_status(
        &self,
        key: &str,
        generation: u64,
        status: NotificationRequestStatus,
    ) -> Result<(), ReconcileError> {
        for _ in 0..MAX_CONFLICT_RETRIES {
            match self.registry.compare_and_set_status(key, generation, status.clone()).await {
                Ok(()) => return Ok(()),
                Err(crate::error::RegistryError::Conflict(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(ReconcileError::ConflictRetryExhausted { key: key.to_string(), attempts: MAX_CONFLICT_RETRIES })
    }
}

struct PhaseOutcome {
    phase: Phase,
    reason: Option<&'static str>,
    message: Option<String>,
}

/// Computes the next phase plus its `status.reason`/`status.message` pair
/// (spec §4.7.1 step 6). The reason codes are the status wire contract and
/// distinct from the `Reason` strings emitted as observability events.
fn compute_phase(channels: &[String], status: &NotificationRequestStatus) -> PhaseOutcome {
    let total = channels.len();
    let succeeded = status.successful_deliveries.len();
    let failed = status.failed_deliveries.len();

    if total > 0 && succeeded == total {
        return PhaseOutcome {
            phase: Phase::Sent,
            reason: Some(status_reason::ALL_DELIVERIES_SUCCEEDED),
            message: Some(format!("all {total} channel(s) delivered successfully")),
        };
    }

    if total > 0 && succeeded == 0 && failed == total {
        let any_failed_after_retry = status.failed_deliveries.iter().any(|ch| {
            status.delivery_attempts.iter().any(|a| &a.channel == ch && a.attempt_number > 1)
        });
        let reason = if any_failed_after_retry {
            status_reason::MAX_RETRIES_EXCEEDED
        } else {
            status_reason::ALL_DELIVERIES_FAILED
        };
        return PhaseOutcome {
            phase: Phase::Failed,
            reason: Some(reason),
            message: Some(format!("all {total} channel(s) failed to deliver")),
        };
    }

    if total > 0 && succeeded + failed == total {
        return PhaseOutcome {
            phase: Phase::PartiallySent,
            reason: Some(status_reason::PARTIAL_DELIVERY_FAILURE),
            message: Some(format!("{succeeded}/{total} channel(s) delivered, {failed} failed")),
        };
    }

    PhaseOutcome { phase: Phase::InProgress, reason: None, message: None }
}

fn dedup_in_place(channels: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    channels.retain(|c| seen.insert(c.clone()));
}

/// Placeholder RFC3339 timestamp source. The embedding binary is expected
/// to supply real wall-clock time via its own event/audit sink wiring;
/// this keeps the reconciler itself free of a hard `SystemTime::now()`
/// dependency so tests stay deterministic.
fn timestamp_placeholder() -> String {
    "1970-01-01T00:00:00Z".to_string()
}

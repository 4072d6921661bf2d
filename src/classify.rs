//! C2: Error Classifier. Maps a delivery outcome to a retry decision.
//!
//! Deliberately a pure function over [`crate::error::DeliveryError`]
//! rather than a generic wrapped-error type: the classification table is
//! the whole contract, so there's nothing to gain from genericity here.

use crate::error::DeliveryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Retryable,
    Permanent,
}

/// HTTP status -> classification table. 4xx (except 408/429) is permanent;
/// 408, 429, and 5xx are retryable. This is a binding decision (see
/// `SPEC_FULL.md` §10.1): 400/401/404 are permanent, never retried.
fn classify_status(status: u16) -> Classification {
    match status {
        408 | 429 => Classification::Retryable,
        400..=499 => Classification::Permanent,
        500..=599 => Classification::Retryable,
        _ => Classification::Permanent,
    }
}

pub fn classify(err: &DeliveryError) -> Classification {
    match err {
        DeliveryError::Http { status, .. } => classify_status(*status),
        DeliveryError::Transport(_) => Classification::Retryable,
        DeliveryError::Timeout => Classification::Retryable,
        DeliveryError::Panic(_) => Classification::Permanent,
    }
}

/// Stable, human-readable rationale string attached to audit events and
/// status messages (spec §7).
pub fn rationale(err: &DeliveryError) -> &'static str {
    match err {
        DeliveryError::Http { status: 400, .. } => "bad_request",
        DeliveryError::Http { status: 401, .. } => "unauthorized",
        DeliveryError::Http { status: 404, .. } => "not_found",
        DeliveryError::Http { status: 408, .. } => "request_timeout",
        DeliveryError::Http { status: 429, .. } => "rate_limited",
        DeliveryError::Http { status: 500..=599, .. } => "server_error",
        DeliveryError::Http { .. } => "client_error",
        DeliveryError::Transport(_) => "transport_error",
        DeliveryError::Timeout => "attempt_timeout",
        DeliveryError::Panic(_) => "delivery_panic",
    }
}

//! Error types surfaced by each component of the controller.
//!
//! Each module boundary gets its own concrete error enum rather than a
//! generic wrapper; this mirrors how the control plane's command layer
//! gives `AuthError` and `CommandError` their own shapes instead of a
//! single catch-all.

use thiserror::Error;

/// Errors the reconciler can return from a single reconcile pass.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReconcileError {
    #[error("request registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("routing config error: {0}")]
    Routing(#[from] RoutingConfigError),

    #[error("credential store error: {0}")]
    Credentials(#[from] CredentialStoreError),

    #[error("request {key:?} has no channels selected and spec.channels is non-empty")]
    NoChannelsSelected { key: String },

    #[error("spec field {field} is immutable and changed after generation {observed_generation}")]
    ImmutableFieldChanged { field: &'static str, observed_generation: u64 },

    #[error("status write conflict for {key:?} exceeded {attempts} bounded retries")]
    ConflictRetryExhausted { key: String, attempts: u32 },
}

/// Errors from the request registry's read/compare-and-set status API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    #[error("no request found for key {0:?}")]
    NotFound(String),

    #[error("compare-and-set rejected: status was updated concurrently for {0:?}")]
    Conflict(String),
}

/// Errors parsing or validating a `RoutingConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RoutingConfigError {
    #[error("failed to parse routing config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("receiver {receiver:?} references unknown credential {credential:?}")]
    UnknownCredential { receiver: String, credential: String },

    #[error("route references unknown receiver {0:?}")]
    UnknownReceiver(String),
}

/// Errors from the credential store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CredentialStoreError {
    #[error("credential {0:?} not found")]
    NotFound(String),

    #[error("failed to read credential file {path:?}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
}

/// Errors a `DeliveryService` can report for a single delivery attempt.
///
/// This is the input to the error classifier (C2); it deliberately keeps
/// enough structure (status code vs. transport vs. panic) for the
/// classifier's table lookup without leaking provider-specific types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeliveryError {
    #[error("http status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("delivery attempt timed out")]
    Timeout,

    #[error("delivery service panicked: {0}")]
    Panic(String),
}

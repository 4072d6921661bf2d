//! Convenient re-exports for embedding the controller.
pub use crate::{
    adaptive::Adaptive,
    audit::{AuditEvent, AuditStore, BufferedAuditEmitter, LoggingAuditStore, RETENTION_DAYS},
    circuit_breaker::{CircuitBreakerConfig, CircuitBreakerPolicy, CircuitState},
    circuit_breaker_registry::CircuitBreakerRegistry,
    classify::{classify, Classification},
    clock::{Clock, MonotonicClock},
    credentials::CredentialStore,
    delivery::{DeliveryService, OutgoingMessage},
    error::{CredentialStoreError, DeliveryError, ReconcileError, RegistryError, RoutingConfigError},
    observability::{reason, EventRecorder, EventType, TracingEventRecorder},
    reconciler::{ReconcileOutcome, Reconciler},
    registry::{InMemoryRequestRegistry, RequestRegistry},
    retry_schedule,
    routing::{ConsoleConfig, Receiver, Route, RouteTree, RoutingConfig, SlackConfig},
    sanitizer::sanitize,
    types::{
        status_reason, ActionLink, AttemptOutcome, DeliveryAttempt, NotificationRequest, NotificationRequestSpec,
        NotificationRequestStatus, Phase, Priority, Recipient, RetryPolicy,
    },
};

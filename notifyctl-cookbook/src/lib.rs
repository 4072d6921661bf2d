//! Ready-to-use setups ("cookbook") for embedding `notifyctl`.
//!
//! Each function wires up a [`notifyctl::reconciler::Reconciler`] with a
//! sensible combination of channels, circuit breaker defaults, and audit
//! emission, so callers have a working starting point instead of having to
//! assemble all seven components themselves. See `examples/` for runnable
//! end-to-end walkthroughs.

use notifyctl::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

/// A reconciler with only the console channel wired up and audit events
/// logged via `tracing` rather than shipped anywhere. Good for local
/// development and the examples in this crate.
pub fn console_only_reconciler(registry: Arc<InMemoryRequestRegistry>) -> Reconciler {
    let mut channels: HashMap<String, Arc<dyn DeliveryService>> = HashMap::new();
    channels.insert("console".to_string(), Arc::new(notifyctl::channels::ConsoleDeliveryService));

    Reconciler::new(
        registry,
        Adaptive::new(RoutingConfig::default()),
        channels,
        CircuitBreakerRegistry::default(),
        Arc::new(BufferedAuditEmitter::new(Arc::new(LoggingAuditStore), 256)),
        Arc::new(TracingEventRecorder),
    )
}

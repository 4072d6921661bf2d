#![forbid(unsafe_code)]
//! `notifyctl`: a reconciling notification delivery controller.
//!
//! Declares a `NotificationRequest` (a desired multi-channel delivery),
//! then reconciles it to completion: sanitize the payload, route it to
//! channels, attempt delivery through per-channel circuit breakers with
//! bounded exponential retry, and record what happened in both the
//! request's own status and an audited event stream.
//!
//! # Quick start
//!
//! ```no_run
//! use notifyctl::prelude::*;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let registry: Arc<dyn RequestRegistry> = Arc::new(InMemoryRequestRegistry::new());
//!
//! let mut channels: HashMap<String, Arc<dyn DeliveryService>> = HashMap::new();
//! channels.insert("console".to_string(), Arc::new(notifyctl::channels::ConsoleDeliveryService));
//!
//! let routing = Adaptive::new(RoutingConfig::default());
//! let audit = Arc::new(BufferedAuditEmitter::new(Arc::new(LoggingAuditStore), 256));
//!
//! let reconciler = Reconciler::new(
//!     registry,
//!     routing,
//!     channels,
//!     CircuitBreakerRegistry::default(),
//!     audit,
//!     Arc::new(TracingEventRecorder),
//! );
//!
//! let outcome = reconciler.reconcile("some-request-key").await;
//! # let _ = outcome;
//! # }
//! ```

mod adaptive;
pub mod audit;
pub mod channels;
pub mod circuit_breaker;
pub mod circuit_breaker_registry;
pub mod classify;
pub mod clock;
pub mod credentials;
pub mod delivery;
pub mod error;
pub mod observability;
pub mod orchestrator;
pub mod reconciler;
pub mod registry;
pub mod retry_schedule;
pub mod routing;
pub mod sanitizer;
pub mod types;

pub mod prelude;

pub use adaptive::Adaptive;

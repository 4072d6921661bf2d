//! Reconciles one `NotificationRequest` across two channels (console and a
//! flaky webhook stand-in) and prints the resulting phase and per-channel
//! attempts, showing the reconcile → requeue loop an external runtime would
//! drive repeatedly.

use async_trait::async_trait;
use notifyctl::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct FlakyWebhook {
    remaining_failures: AtomicUsize,
}

#[async_trait]
impl DeliveryService for FlakyWebhook {
    fn channel_key(&self) -> String {
        "webhook:status-page".to_string()
    }

    async fn deliver(&self, _message: &OutgoingMessage) -> Result<(), DeliveryError> {
        if self.remaining_failures.fetch_sub(1, Ordering::SeqCst) > 0 {
            return Err(DeliveryError::Http { status: 503, message: "upstream busy".into() });
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let registry = Arc::new(InMemoryRequestRegistry::new());
    registry.insert(NotificationRequest {
        name: "deploy-42".to_string(),
        generation: 1,
        spec: NotificationRequestSpec {
            notification_type: "deploy.completed".into(),
            priority: Priority::High,
            subject: "Deploy 42 finished".into(),
            body: "rolled out to prod in 90s".into(),
            recipients: vec![Recipient::Console],
            channels: vec!["console".to_string(), "webhook:status-page".to_string()],
            metadata: BTreeMap::new(),
            action_links: vec![],
            retry_policy: RetryPolicy::default(),
            labels: BTreeMap::new(),
        },
        status: Default::default(),
    });

    let mut channels: HashMap<String, Arc<dyn DeliveryService>> = HashMap::new();
    channels.insert("console".to_string(), Arc::new(notifyctl::channels::ConsoleDeliveryService));
    channels.insert("webhook:status-page".to_string(), Arc::new(FlakyWebhook { remaining_failures: AtomicUsize::new(2) }));

    let reconciler = Reconciler::new(
        registry.clone(),
        Adaptive::new(RoutingConfig::default()),
        channels,
        CircuitBreakerRegistry::default(),
        Arc::new(BufferedAuditEmitter::new(Arc::new(LoggingAuditStore), 64)),
        Arc::new(TracingEventRecorder),
    );

    loop {
        let outcome = reconciler.reconcile("deploy-42").await?;
        println!("phase = {:?}, requeue_after = {:?}", outcome.phase, outcome.requeue_after);
        match outcome.requeue_after {
            Some(delay) => tokio::time::sleep(delay).await,
            None => break,
        }
    }

    let stored = registry.get("deploy-42").await?;
    println!("successful: {:?}", stored.status.successful_deliveries);
    println!("failed: {:?}", stored.status.failed_deliveries);
    Ok(())
}

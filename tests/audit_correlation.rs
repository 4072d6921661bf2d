mod common;

use common::test_helpers::{CollectingAuditStore, ScriptedDeliveryService};
use notifyctl::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn audit_events_carry_the_remediation_correlation_id() {
    let registry = Arc::new(InMemoryRequestRegistry::new());

    let mut metadata = BTreeMap::new();
    metadata.insert("remediationRequestName".to_string(), "remediation-42".to_string());

    registry.insert(NotificationRequest {
        name: "req-correlated".to_string(),
        generation: 1,
        spec: NotificationRequestSpec {
            notification_type: "remediation.started".into(),
            priority: Priority::High,
            subject: "Auto-remediation started".into(),
            body: "restarting pod".into(),
            recipients: vec![Recipient::Console],
            channels: vec!["console".to_string()],
            metadata,
            action_links: vec![],
            retry_policy: RetryPolicy::default(),
            labels: BTreeMap::new(),
        },
        status: Default::default(),
    });

    let mut channels: HashMap<String, Arc<dyn DeliveryService>> = HashMap::new();
    channels.insert("console".to_string(), Arc::new(ScriptedDeliveryService::new("console", 200, 0)));

    let store = Arc::new(CollectingAuditStore::default());
    let emitter = Arc::new(BufferedAuditEmitter::new(store.clone(), 64));

    let reconciler = Reconciler::new(
        registry.clone(),
        Adaptive::new(RoutingConfig::default()),
        channels,
        CircuitBreakerRegistry::default(),
        emitter,
        Arc::new(TracingEventRecorder),
    );

    reconciler.reconcile("req-correlated").await.unwrap();

    let mut events = store.events.lock().unwrap().clone();
    for _ in 0..50 {
        if !events.is_empty() {
            break;
        }
        drop(events);
        tokio::time::sleep(Duration::from_millis(20)).await;
        events = store.events.lock().unwrap().clone();
    }

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].correlation_id.as_deref(), Some("remediation-42"));
    assert_eq!(events[0].resource_id, "req-correlated");
}

//! C5: Delivery Orchestrator. Wraps a single delivery attempt with the
//! breaker, a 10s per-attempt deadline (spec §5), and panic containment.
//!
//! Grounded on the teacher's `TimeoutPolicy::execute` wrapping pattern
//! (`examples/flyingrobots-ninelives/src/timeout.rs`) and its
//! composition-of-policies shape (`stack.rs`), adapted to a concrete
//! `DeliveryService` instead of a generic `Future`-returning closure.

use crate::circuit_breaker::{CircuitBreakerPolicy, CircuitOpenError};
use crate::classify::{self, Classification};
use crate::delivery::{DeliveryService, OutgoingMessage};
use crate::error::DeliveryError;
use std::sync::Arc;
use std::time::Duration;

/// Per-attempt deadline budget (spec §5): every delivery attempt, however
/// the channel implements it, is bounded to this duration.
pub const ATTEMPT_DEADLINE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Success,
    Failed { error: DeliveryError, classification: Classification },
    CircuitOpen { failure_count: usize },
}

/// Runs one delivery attempt against `service` through `breaker`,
/// enforcing the deadline and catching panics.
pub async fn attempt(
    breaker: &CircuitBreakerPolicy,
    service: Arc<dyn DeliveryService>,
    message: OutgoingMessage,
) -> AttemptResult {
    let outcome = breaker
        .execute(
            |_e: &DeliveryError| true,
            move || {
                let service = service.clone();
                let message = message.clone();
                run_with_deadline(service, message)
            },
        )
        .await;

    match outcome {
        Err(CircuitOpenError { failure_count, .. }) => AttemptResult::CircuitOpen { failure_count },
        Ok(Ok(())) => AttemptResult::Success,
        Ok(Err(error)) => {
            let classification = classify::classify(&error);
            AttemptResult::Failed { error, classification }
        }
    }
}

async fn run_with_deadline(
    service: Arc<dyn DeliveryService>,
    message: OutgoingMessage,
) -> Result<(), DeliveryError> {
    let task = tokio::spawn(async move { service.deliver(&message).await });

    match tokio::time::timeout(ATTEMPT_DEADLINE, task).await {
        Ok(Ok(delivery_result)) => delivery_result,
        Ok(Err(join_error)) => {
            if join_error.is_panic() {
                Err(DeliveryError::Panic(join_error.to_string()))
            } else {
                Err(DeliveryError::Transport(format!("delivery task cancelled: {join_error}")))
            }
        }
        Err(_elapsed) => Err(DeliveryError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Recipient;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedService {
        key: String,
        fail_times: AtomicUsize,
        status: u16,
        panics: bool,
        sleep: Option<Duration>,
    }

    #[async_trait]
    impl DeliveryService for ScriptedService {
        fn channel_key(&self) -> String {
            self.key.clone()
        }

        async fn deliver(&self, _message: &OutgoingMessage) -> Result<(), DeliveryError> {
            if let Some(d) = self.sleep {
                tokio::time::sleep(d).await;
            }
            if self.panics {
                panic!("scripted panic");
            }
            let remaining = self.fail_times.load(Ordering::SeqCst);
            if remaining > 0 {
                self.fail_times.fetch_sub(1, Ordering::SeqCst);
                return Err(DeliveryError::Http { status: self.status, message: "scripted failure".into() });
            }
            Ok(())
        }
    }

    fn message() -> OutgoingMessage {
        OutgoingMessage {
            subject: "s".into(),
            body: "b".into(),
            recipients: vec![Recipient::Console],
            metadata: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn successful_attempt_reports_success() {
        let breaker = CircuitBreakerPolicy::new(5, Duration::from_secs(30));
        let service = Arc::new(ScriptedService {
            key: "console".into(),
            fail_times: AtomicUsize::new(0),
            status: 200,
            panics: false,
            sleep: None,
        });
        let result = attempt(&breaker, service, message()).await;
        assert_eq!(result, AttemptResult::Success);
    }

    #[tokio::test]
    async fn retryable_failure_classified_retryable() {
        let breaker = CircuitBreakerPolicy::new(5, Duration::from_secs(30));
        let service = Arc::new(ScriptedService {
            key: "webhook".into(),
            fail_times: AtomicUsize::new(1),
            status: 503,
            panics: false,
            sleep: None,
        });
        let result = attempt(&breaker, service, message()).await;
        match result {
            AttemptResult::Failed { classification, .. } => {
                assert_eq!(classification, Classification::Retryable)
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn permanent_failure_classified_permanent() {
        let breaker = CircuitBreakerPolicy::new(5, Duration::from_secs(30));
        let service = Arc::new(ScriptedService {
            key: "webhook".into(),
            fail_times: AtomicUsize::new(1),
            status: 404,
            panics: false,
            sleep: None,
        });
        let result = attempt(&breaker, service, message()).await;
        match result {
            AttemptResult::Failed { classification, .. } => {
                assert_eq!(classification, Classification::Permanent)
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn panic_is_caught_and_classified_permanent() {
        let breaker = CircuitBreakerPolicy::new(5, Duration::from_secs(30));
        let service = Arc::new(ScriptedService {
            key: "webhook".into(),
            fail_times: AtomicUsize::new(0),
            status: 200,
            panics: true,
            sleep: None,
        });
        let result = attempt(&breaker, service, message()).await;
        match result {
            AttemptResult::Failed { error: DeliveryError::Panic(_), classification } => {
                assert_eq!(classification, Classification::Permanent)
            }
            other => panic!("expected Panic failure, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exceeding_deadline_times_out() {
        let breaker = CircuitBreakerPolicy::new(5, Duration::from_secs(30));
        let service = Arc::new(ScriptedService {
            key: "slow".into(),
            fail_times: AtomicUsize::new(0),
            status: 200,
            panics: false,
            sleep: Some(ATTEMPT_DEADLINE + Duration::from_secs(1)),
        });
        let handle = tokio::spawn(attempt(&breaker, service, message()));
        tokio::time::advance(ATTEMPT_DEADLINE + Duration::from_secs(2)).await;
        let result = handle.await.unwrap();
        match result {
            AttemptResult::Failed { error: DeliveryError::Timeout, classification } => {
                assert_eq!(classification, Classification::Retryable)
            }
            other => panic!("expected Timeout failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn open_circuit_short_circuits_without_calling_service() {
        let breaker = CircuitBreakerPolicy::new(1, Duration::from_secs(999));
        let failing = Arc::new(ScriptedService {
            key: "webhook".into(),
            fail_times: AtomicUsize::new(1),
            status: 500,
            panics: false,
            sleep: None,
        });
        let _ = attempt(&breaker, failing, message()).await;

        let never_called = Arc::new(ScriptedService {
            key: "webhook".into(),
            fail_times: AtomicUsize::new(0),
            status: 200,
            panics: false,
            sleep: None,
        });
        let result = attempt(&breaker, never_called, message()).await;
        assert!(matches!(result, AttemptResult::CircuitOpen { .. }));
    }
}

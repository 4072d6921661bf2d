//! C4: Circuit Breaker Manager. Per-channel lock-free state machine.
//!
//! ```text
//!        failures >= threshold
//!  Closed ───────────────────▶ Open
//!    ▲                           │
//!    │ success                   │ recovery_timeout elapsed
//!    │                           ▼
//!    └───────────────────── HalfOpen
//!               failure
//! ```
//!
//! Generalized from the resilience-stack breaker: the policy shape and
//! atomics are unchanged, but `execute` takes a caller-supplied
//! `is_failure` predicate instead of counting every `Err` against the
//! breaker. The orchestrator (C5) calls it with a predicate that always
//! returns true, since any delivery failure, retryable or permanent,
//! still indicates the receiving channel is unhealthy.

use crate::clock::{Clock, MonotonicClock};
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const STATE_CLOSED: u8 = 0;
const STATE_OPEN: u8 = 1;
const STATE_HALF_OPEN: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Returned when the breaker short-circuits a call instead of running it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("circuit open: {failure_count} failures, open for {open_duration:?}")]
pub struct CircuitOpenError {
    pub failure_count: usize,
    pub open_duration: Duration,
}

#[derive(Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: usize,
    pub recovery_timeout: Duration,
    pub half_open_max_calls: usize,
}

impl CircuitBreakerConfig {
    pub fn disabled() -> Self {
        Self {
            failure_threshold: usize::MAX,
            recovery_timeout: Duration::from_secs(0),
            half_open_max_calls: usize::MAX,
        }
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { failure_threshold: 5, recovery_timeout: Duration::from_secs(30), half_open_max_calls: 1 }
    }
}

struct CircuitBreakerState {
    state: AtomicU8,
    failure_count: AtomicUsize,
    opened_at_millis: AtomicU64,
    half_open_calls: AtomicUsize,
}

#[derive(Clone)]
pub struct CircuitBreakerPolicy {
    state: Arc<CircuitBreakerState>,
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
}

impl CircuitBreakerPolicy {
    pub fn new(failure_threshold: usize, recovery_timeout: Duration) -> Self {
        Self::with_config(CircuitBreakerConfig {
            failure_threshold,
            recovery_timeout,
            half_open_max_calls: 1,
        })
    }

    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self {
            state: Arc::new(CircuitBreakerState {
                state: AtomicU8::new(STATE_CLOSED),
                failure_count: AtomicUsize::new(0),
                opened_at_millis: AtomicU64::new(0),
                half_open_calls: AtomicUsize::new(0),
            }),
            config,
            clock: Arc::new(MonotonicClock::default()),
        }
    }

    /// Override the clock (deterministic tests).
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_half_open_limit(mut self, limit: usize) -> Self {
        self.config.half_open_max_calls = limit;
        self
    }

    pub fn current_state(&self) -> CircuitState {
        match self.state.state.load(Ordering::Acquire) {
            STATE_OPEN => CircuitState::Open,
            STATE_HALF_OPEN => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }

    /// Runs `operation`, gating it on breaker state and updating the
    /// breaker from the outcome. `is_failure` classifies an `Err` as
    /// counting against the breaker (both retryable and permanent
    /// delivery failures do; a caller that wants to exempt certain
    /// outcomes can return `false` there).
    pub async fn execute<T, E, Fut, Op>(
        &self,
        is_failure: impl Fn(&E) -> bool,
        mut operation: Op,
    ) -> Result<Result<T, E>, CircuitOpenError>
    where
        Fut: Future<Output = Result<T, E>> + Send,
        Op: FnMut() -> Fut + Send,
    {
        loop {
            let current_state = self.state.state.load(Ordering::Acquire);
            match current_state {
                STATE_OPEN => {
                    let opened_at = self.state.opened_at_millis.load(Ordering::Acquire);
                    let now = self.clock.now_millis();
                    let elapsed = now.saturating_sub(opened_at);

                    if elapsed >= self.config.recovery_timeout.as_millis() as u64 {
                        match self.state.state.compare_exchange(
                            STATE_OPEN,
                            STATE_HALF_OPEN,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        ) {
                            Ok(_) => {
                                tracing::info!("circuit breaker -> half-open");
                                self.state.half_open_calls.store(1, Ordering::Release);
                                break;
                            }
                            Err(STATE_HALF_OPEN) => continue,
                            Err(STATE_CLOSED) => break,
                            Err(_) => unreachable!("invalid state transition"),
                        }
                    } else {
                        return Err(CircuitOpenError {
                            failure_count: self.state.failure_count.load(Ordering::Acquire),
                            open_duration: Duration::from_millis(elapsed),
                        });
                    }
                }
                STATE_HALF_OPEN => {
                    let current = self.state.half_open_calls.fetch_add(1, Ordering::AcqRel);
                    if current >= self.config.half_open_max_calls {
                        self.state.half_open_calls.fetch_sub(1, Ordering::Release);
                        return Err(CircuitOpenError {
                            failure_count: self.state.failure_count.load(Ordering::Acquire),
                            open_duration: Duration::from_millis(0),
                        });
                    }
                    break;
                }
                STATE_CLOSED => break,
                _ => unreachable!("invalid circuit breaker state"),
            }
        }

        let was_half_open = self.state.state.load(Ordering::Acquire) == STATE_HALF_OPEN;
        let result = operation().await;

        if was_half_open {
            self.state.half_open_calls.fetch_sub(1, Ordering::Release);
        }

        match &result {
            Ok(_) => self.on_success(),
            Err(e) if is_failure(e) => self.on_failure(),
            Err(_) => {}
        }

        Ok(result)
    }

    fn on_success(&self) {
        let current = self.state.state.load(Ordering::Acquire);
        match current {
            STATE_HALF_OPEN => {
                if self
                    .state
                    .state
                    .compare_exchange(STATE_HALF_OPEN, STATE_CLOSED, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    self.state.failure_count.store(0, Ordering::Release);
                    self.state.opened_at_millis.store(0, Ordering::Release);
                    tracing::info!("circuit breaker -> closed");
                }
            }
            STATE_CLOSED => self.state.failure_count.store(0, Ordering::Release),
            _ => {}
        }
    }

    fn on_failure(&self) {
        let current = self.state.state.load(Ordering::Acquire);
        let failures = self.state.failure_count.fetch_add(1, Ordering::AcqRel) + 1;

        match current {
            STATE_HALF_OPEN => {
                if self
                    .state
                    .state
                    .compare_exchange(STATE_HALF_OPEN, STATE_OPEN, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    self.state.opened_at_millis.store(self.clock.now_millis(), Ordering::Release);
                    tracing::warn!(failures, "circuit breaker: half-open test failed -> open");
                }
            }
            STATE_CLOSED => {
                if failures >= self.config.failure_threshold {
                    if self
                        .state
                        .state
                        .compare_exchange(STATE_CLOSED, STATE_OPEN, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        self.state.opened_at_millis.store(self.clock.now_millis(), Ordering::Release);
                        tracing::error!(
                            failures,
                            threshold = self.config.failure_threshold,
                            "circuit breaker -> open"
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock as ClockTrait;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    struct ManualClock {
        now: Arc<AtomicU64>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self { now: Arc::new(AtomicU64::new(0)) }
        }
        fn advance(&self, millis: u64) {
            self.now.fetch_add(millis, Ordering::SeqCst);
        }
    }

    impl ClockTrait for ManualClock {
        fn now_millis(&self) -> u64 {
            self.now.load(Ordering::SeqCst)
        }
    }

    fn always_failure(_e: &&'static str) -> bool {
        true
    }

    #[tokio::test]
    async fn starts_closed_and_executes() {
        let breaker = CircuitBreakerPolicy::new(3, Duration::from_secs(1));
        let result = breaker.execute(always_failure, || async { Ok::<_, &'static str>(42) }).await;
        assert_eq!(result.unwrap().unwrap(), 42);
    }

    #[tokio::test]
    async fn opens_after_threshold_failures() {
        let breaker = CircuitBreakerPolicy::new(3, Duration::from_secs(10));
        for _ in 0..3 {
            let _ = breaker.execute(always_failure, || async { Err::<(), _>("fail") }).await;
        }
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        let result = breaker
            .execute(always_failure, || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, &'static str>(42)
                }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 0, "should not execute when open");
    }

    #[tokio::test]
    async fn half_open_after_recovery_and_closes_on_success() {
        let clock = ManualClock::new();
        let breaker = CircuitBreakerPolicy::new(1, Duration::from_millis(100)).with_clock(clock.clone());

        let _ = breaker.execute(always_failure, || async { Err::<(), _>("fail") }).await;
        assert!(breaker.execute(always_failure, || async { Ok::<_, &'static str>(()) }).await.is_err());

        clock.advance(150);
        let result = breaker.execute(always_failure, || async { Ok::<_, &'static str>(7) }).await;
        assert_eq!(result.unwrap().unwrap(), 7);
        assert_eq!(breaker.current_state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn half_open_failure_reopens() {
        let clock = ManualClock::new();
        let breaker = CircuitBreakerPolicy::new(1, Duration::from_millis(100)).with_clock(clock.clone());
        let _ = breaker.execute(always_failure, || async { Err::<(), _>("fail") }).await;
        clock.advance(150);
        let _ = breaker.execute(always_failure, || async { Err::<(), _>("fail again") }).await;
        assert_eq!(breaker.current_state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn non_failure_errors_do_not_trip_breaker() {
        let breaker = CircuitBreakerPolicy::new(1, Duration::from_secs(10));
        for _ in 0..5 {
            let _ = breaker.execute(|_e: &&'static str| false, || async { Err::<(), _>("ignored") }).await;
        }
        assert_eq!(breaker.current_state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn disabled_breaker_never_opens() {
        let breaker = CircuitBreakerPolicy::with_config(CircuitBreakerConfig::disabled());
        for _ in 0..1000 {
            let _ = breaker.execute(always_failure, || async { Err::<(), _>("fail") }).await;
        }
        assert_eq!(breaker.current_state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn half_open_limits_concurrent_calls() {
        let clock = ManualClock::new();
        let breaker = CircuitBreakerPolicy::new(1, Duration::from_millis(100))
            .with_clock(clock.clone())
            .with_half_open_limit(1);
        let _ = breaker.execute(always_failure, || async { Err::<(), _>("fail") }).await;
        clock.advance(150);

        let mut handles = vec![];
        for _ in 0..3 {
            let breaker = breaker.clone();
            handles.push(tokio::spawn(async move {
                breaker
                    .execute(always_failure, || async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok::<_, &'static str>(1)
                    })
                    .await
            }));
        }
        let results: Vec<_> = futures::future::join_all(handles).await;
        let successes = results.iter().filter(|r| r.as_ref().unwrap().is_ok()).count();
        assert_eq!(successes, 1);
    }
}

//! Keyed ring of per-channel circuit breakers (spec §4.4: "one breaker per
//! channel key, never shared across channels").

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::circuit_breaker::{CircuitBreakerConfig, CircuitBreakerPolicy, CircuitState};

/// Registry of circuit breakers keyed by channel id. Breakers are created
/// lazily on first use with a shared default config, so a channel that has
/// never failed doesn't need an explicit registration step.
#[derive(Clone)]
pub struct CircuitBreakerRegistry {
    inner: Arc<Mutex<HashMap<String, CircuitBreakerPolicy>>>,
    default_config: CircuitBreakerConfig,
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreakerRegistry {
    pub fn new(default_config: CircuitBreakerConfig) -> Self {
        Self { inner: Arc::new(Mutex::new(HashMap::new())), default_config }
    }

    /// Returns the breaker for `channel`, creating one with the default
    /// config if this is the first time this channel has been seen.
    pub fn get_or_create(&self, channel: &str) -> CircuitBreakerPolicy {
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.entry(channel.to_string())
            .or_insert_with(|| CircuitBreakerPolicy::with_config(self.default_config.clone()))
            .clone()
    }

    /// Registers an explicit breaker for `channel`, overwriting any prior
    /// entry (used when a channel needs a non-default config).
    pub fn register(&self, channel: String, policy: CircuitBreakerPolicy) {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).insert(channel, policy);
    }

    /// Snapshot of every registered breaker's current state, sorted by
    /// channel key for deterministic inspection/audit output.
    pub fn snapshot(&self) -> Vec<(String, CircuitState)> {
        let map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let mut entries: Vec<(String, CircuitState)> =
            map.iter().map(|(k, v)| (k.clone(), v.current_state())).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

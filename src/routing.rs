//! `RoutingConfig`: YAML-defined receiver graph that selects channels for
//! a request when `spec.channels` is empty (spec §3, §6).
//!
//! Grounded on the teacher's `ConfigRegistry`/`InMemoryConfigRegistry`
//! trait-plus-impl idiom
//! (`examples/flyingrobots-ninelives/src/control/handler.rs`), with the
//! config itself YAML instead of an in-memory map of adaptive handles.
//! The schema is a default receiver plus a match-rule tree, matching the
//! wire format spec §6 fixes: `route: { receiver, routes }` and
//! `receivers: [{ name, slackConfigs, consoleConfigs }]`.

use crate::credentials::CredentialStore;
use crate::error::RoutingConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RoutingConfig {
    pub route: RouteTree,
    pub receivers: Vec<Receiver>,
}

/// The root of the match-rule tree: `receiver` is the fallback used when
/// no rule in `routes` matches a request's labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RouteTree {
    #[serde(default)]
    pub receiver: String,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    #[serde(rename = "match", default)]
    pub match_labels: BTreeMap<String, String>,
    pub receiver: String,
}

/// A named routing-config node grouping per-channel configurations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Receiver {
    pub name: String,
    #[serde(default)]
    pub slack_configs: Vec<SlackConfig>,
    #[serde(default)]
    pub console_configs: Vec<ConsoleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlackConfig {
    pub channel: String,
    #[serde(default)]
    pub credential_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    #[serde(default = "default_console_enabled")]
    pub enabled: bool,
}

fn default_console_enabled() -> bool {
    true
}

impl Receiver {
    /// Effective channel keys for this receiver: one `slack:<channel>` per
    /// Slack config, plus `console` for every enabled console config.
    fn channel_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for slack in &self.slack_configs {
            keys.push(format!("slack:{}", slack.channel));
        }
        for console in &self.console_configs {
            if console.enabled {
                keys.push("console".to_string());
            }
        }
        keys
    }
}

impl RoutingConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, RoutingConfigError> {
        let config: RoutingConfig = serde_yaml::from_str(yaml)?;
        config.validate_references()?;
        Ok(config)
    }

    fn validate_references(&self) -> Result<(), RoutingConfigError> {
        let receiver_names: std::collections::HashSet<&str> =
            self.receivers.iter().map(|r| r.name.as_str()).collect();
        if !self.route.receiver.is_empty() && !receiver_names.contains(self.route.receiver.as_str()) {
            return Err(RoutingConfigError::UnknownReceiver(self.route.receiver.clone()));
        }
        for route in &self.route.routes {
            if !receiver_names.contains(route.receiver.as_str()) {
                return Err(RoutingConfigError::UnknownReceiver(route.receiver.clone()));
            }
        }
        Ok(())
    }

    /// Validates that every receiver's `credentialRef` resolves against
    /// the current credential snapshot. Construction-time validation per
    /// spec §6: callers should reject (and keep the previously active
    /// config) rather than accept a config with a dangling ref.
    pub fn validate_credentials(&self, store: &CredentialStore) -> Result<(), RoutingConfigError> {
        for receiver in &self.receivers {
            for slack in &receiver.slack_configs {
                if let Some(credential) = &slack.credential_ref {
                    if store.get(credential).is_none() {
                        return Err(RoutingConfigError::UnknownCredential {
                            receiver: receiver.name.clone(),
                            credential: credential.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Channel keys selected for a request's labels, per spec §4.7.1 step
    /// 3: the first route whose `match` is a subset of the request's
    /// labels wins; if none match, the default receiver applies.
    pub fn select_channels(&self, labels: &BTreeMap<String, String>) -> Vec<String> {
        let receiver_name = self
            .route
            .routes
            .iter()
            .find(|route| {
                route.match_labels.iter().all(|(k, v)| labels.get(k).map(|actual| actual == v).unwrap_or(false))
            })
            .map(|route| route.receiver.as_str())
            .unwrap_or(self.route.receiver.as_str());

        self.receivers
            .iter()
            .find(|r| r.name == receiver_name)
            .map(Receiver::channel_keys)
            .unwrap_or_default()
    }
}

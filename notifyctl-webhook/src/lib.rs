//! Slack-compatible and generic webhook delivery channels for `notifyctl`.
//!
//! Bring your own [`reqwest::Client`]; each channel owns only the URL/shape
//! it POSTs, mirroring how `notifyctl-audit-http` and the teacher's
//! `ninelives-elastic` bring their own client rather than owning a pool.

use async_trait::async_trait;
use notifyctl::prelude::{DeliveryError, DeliveryService, OutgoingMessage};
use serde_json::json;

/// Posts messages to a Slack incoming-webhook URL using the
/// `blocks[0].text.text` shape (spec §6.3).
#[derive(Clone, Debug)]
pub struct SlackWebhookService {
    key: String,
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackWebhookService {
    pub fn new(key: impl Into<String>, webhook_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self { key: key.into(), webhook_url: webhook_url.into(), client }
    }
}

#[async_trait]
impl DeliveryService for SlackWebhookService {
    fn channel_key(&self) -> String {
        self.key.clone()
    }

    async fn deliver(&self, message: &OutgoingMessage) -> Result<(), DeliveryError> {
        let payload = json!({
            "blocks": [
                {
                    "type": "section",
                    "text": { "type": "mrkdwn", "text": format!("*{}*", message.subject) }
                },
                {
                    "type": "section",
                    "text": { "type": "mrkdwn", "text": message.body }
                }
            ]
        });
        post_json(&self.client, &self.webhook_url, payload).await
    }
}

/// Posts a generic JSON envelope to an arbitrary webhook URL, used for
/// `Recipient::WebhookUrl` recipients that aren't routed through Slack.
#[derive(Clone, Debug)]
pub struct GenericWebhookService {
    key: String,
    client: reqwest::Client,
}

impl GenericWebhookService {
    pub fn new(key: impl Into<String>, client: reqwest::Client) -> Self {
        Self { key: key.into(), client }
    }
}

#[async_trait]
impl DeliveryService for GenericWebhookService {
    fn channel_key(&self) -> String {
        self.key.clone()
    }

    async fn deliver(&self, message: &OutgoingMessage) -> Result<(), DeliveryError> {
        let Some(url) = message.recipients.iter().find_map(|r| match r {
            notifyctl::prelude::Recipient::WebhookUrl { url } => Some(url.clone()),
            _ => None,
        }) else {
            return Err(DeliveryError::Transport("no webhook_url recipient on message".into()));
        };

        let payload = json!({
            "subject": message.subject,
            "body": message.body,
            "metadata": message.metadata,
        });
        post_json(&self.client, &url, payload).await
    }
}

async fn post_json(client: &reqwest::Client, url: &str, payload: serde_json::Value) -> Result<(), DeliveryError> {
    let response = client
        .post(url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                DeliveryError::Timeout
            } else {
                DeliveryError::Transport(e.to_string())
            }
        })?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(DeliveryError::Http { status: status.as_u16(), message: body })
}

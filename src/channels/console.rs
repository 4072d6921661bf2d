//! Console channel: logs the message via `tracing` instead of sending it
//! anywhere. Grounded on the teacher's `LogSink`
//! (`examples/flyingrobots-ninelives/src/telemetry/sinks.rs`), which does
//! the same "observability backend as delivery target" trick.

use crate::delivery::{DeliveryService, OutgoingMessage};
use crate::error::DeliveryError;
use async_trait::async_trait;

pub struct ConsoleDeliveryService;

#[async_trait]
impl DeliveryService for ConsoleDeliveryService {
    fn channel_key(&self) -> String {
        "console".to_string()
    }

    async fn deliver(&self, message: &OutgoingMessage) -> Result<(), DeliveryError> {
        tracing::info!(
            subject = %message.subject,
            recipients = ?message.recipients,
            "{}",
            message.body
        );
        Ok(())
    }
}

use async_trait::async_trait;
use tracing::info;

use crate::domain::boundaries::delivery::{DeliveryChannel, DeliveryError};

/// Delivery channel that writes notifications to the process log. Stands
/// in for a real transport when the engine runs headless.
#[derive(Debug, Default)]
pub struct LogDeliveryChannel;

#[async_trait]
impl DeliveryChannel for LogDeliveryChannel {
    async fn send(&self, destination: i64, text: &str) -> Result<(), DeliveryError> {
        info!(destination, "{}", text);
        Ok(())
    }
}

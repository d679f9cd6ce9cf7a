use std::sync::Arc;

use tracing::warn;

use crate::domain::boundaries::delivery::DeliveryChannel;
use crate::domain::entities::fire_event::{AlertStage, FireEvent};

/// Formats a fire event and forwards it to the delivery channel.
#[derive(Clone)]
pub struct NotificationService {
    channel: Arc<dyn DeliveryChannel>,
}

impl NotificationService {
    pub fn new(channel: Arc<dyn DeliveryChannel>) -> Self {
        Self { channel }
    }

    /// Dispatch one event. Delivery failures are logged and swallowed:
    /// at-most-once, no retry.
    pub async fn dispatch(&self, event: &FireEvent) {
        let text = format_notification(event);
        if let Err(err) = self.channel.send(event.destination, &text).await {
            warn!(
                task_id = event.task_id,
                destination = event.destination,
                "{}",
                err
            );
        }
    }
}

fn format_notification(event: &FireEvent) -> String {
    match event.stage {
        AlertStage::HalfHour => format!("Reminder in 30 minutes: {}", event.description),
        AlertStage::QuarterHour => format!("Reminder in 15 minutes: {}", event.description),
        AlertStage::Due => format!("Reminder: {}", event.description),
    }
}

use async_trait::async_trait;

/// The delivery channel could not take the notification. Best effort by
/// design: the dispatcher logs the failure and moves on, no retry.
#[derive(Debug)]
pub struct DeliveryError(pub String);

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "delivery failed: {}", self.0)
    }
}

impl std::error::Error for DeliveryError {}

/// Transport that carries a finished notification string to a destination.
/// Implemented outside the engine (messenger API, console, test double).
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn send(&self, destination: i64, text: &str) -> Result<(), DeliveryError>;
}

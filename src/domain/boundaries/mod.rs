pub mod delivery;
pub mod extraction;

pub use delivery::{DeliveryChannel, DeliveryError};
pub use extraction::{ExtractionResult, Extractor};

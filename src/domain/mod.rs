pub mod boundaries;
pub mod entities;
pub mod repositories;
pub mod value_objects;

pub use entities::fire_event::{AlertStage, FireEvent};
pub use entities::task::{Schedule, Task};

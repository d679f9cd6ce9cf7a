use async_trait::async_trait;

use crate::domain::entities::task::{Schedule, Task};

/// Persistence failure. A mutating operation that hits one of these aborts
/// and leaves the previous durable state untouched.
#[derive(Debug)]
pub enum StoreError {
    Io(String),
    Corrupt(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "store I/O failure: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "store contents unreadable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable record of all reminders. The timer engine's queue is derived
/// from this store and rebuilt on restart; the store is the only source
/// of truth.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Append a task and return it with its assigned stable id.
    async fn add_task(
        &self,
        destination: i64,
        description: String,
        schedule: Schedule,
    ) -> Result<Task, StoreError>;

    /// Every task, in insertion order.
    async fn list_tasks(&self) -> Vec<Task>;

    /// Tasks for one destination, in insertion order.
    async fn list_for_destination(&self, destination: i64) -> Vec<Task>;

    async fn get_task(&self, task_id: u64) -> Option<Task>;

    /// Remove one task by id. Ok(false) if no such task existed.
    async fn remove_task(&self, task_id: u64) -> Result<bool, StoreError>;

    /// Remove every task for a destination, returning the removed tasks.
    async fn remove_all_for_destination(&self, destination: i64) -> Result<Vec<Task>, StoreError>;
}

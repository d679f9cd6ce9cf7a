pub mod notification_service;
pub mod task_service;

pub use notification_service::NotificationService;
pub use task_service::{ServiceError, TaskService};

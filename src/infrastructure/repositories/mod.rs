pub mod json_storage;
pub mod json_task_repository;

pub use json_task_repository::JsonTaskRepository;

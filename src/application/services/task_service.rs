use std::sync::Arc;

use chrono::{DateTime, Utc, Weekday};
use tracing::info;

use crate::application::planner;
use crate::domain::boundaries::extraction::ExtractionResult;
use crate::domain::entities::task::{Schedule, Task};
use crate::domain::repositories::task_repository::{StoreError, TaskRepository};
use crate::domain::value_objects::reference_time::reference_date;
use crate::domain::value_objects::weekday_format::normalize_weekdays;
use crate::infrastructure::scheduler::timer_engine::TimerEngine;

#[derive(Debug)]
pub enum ServiceError {
    /// The extractor produced nothing usable; ask the user to rephrase.
    ExtractionAmbiguous,
    EmptyDescription,
    /// One-off instant not strictly in the future.
    InPast,
    InvalidTime { hour: u8, minute: u8 },
    NoWeekdays,
    /// Cancellation index outside the current listing.
    OutOfRange { index: usize, count: usize },
    Store(StoreError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ServiceError::ExtractionAmbiguous => {
                write!(f, "could not understand the reminder, please rephrase")
            }
            ServiceError::EmptyDescription => write!(f, "reminder description cannot be empty"),
            ServiceError::InPast => write!(f, "cannot create a reminder in the past"),
            ServiceError::InvalidTime { hour, minute } => {
                write!(f, "invalid time of day {:02}:{:02}", hour, minute)
            }
            ServiceError::NoWeekdays => {
                write!(f, "a weekly reminder needs at least one weekday")
            }
            ServiceError::OutOfRange { index, count } => {
                write!(f, "no reminder at position {} (you have {})", index, count)
            }
            ServiceError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Store(e)
    }
}

/// Creation, listing and cancellation of reminders for one store and one
/// timer engine. Cancellation removes the task and disarms its pending
/// events as one operation.
#[derive(Clone)]
pub struct TaskService {
    task_repo: Arc<dyn TaskRepository>,
    engine: Arc<TimerEngine>,
}

impl TaskService {
    pub fn new(task_repo: Arc<dyn TaskRepository>, engine: Arc<TimerEngine>) -> Self {
        Self { task_repo, engine }
    }

    // === creation ===

    /// Create every reminder described by one extraction result.
    pub async fn create_from_extraction(
        &self,
        destination: i64,
        extraction: ExtractionResult,
    ) -> Result<Vec<Task>, ServiceError> {
        match extraction {
            ExtractionResult::NoExtraction => Err(ServiceError::ExtractionAmbiguous),
            ExtractionResult::SingleOneOff(draft) => Ok(vec![
                self.create_one_off(destination, draft.description, draft.at)
                    .await?,
            ]),
            ExtractionResult::MultipleOneOff(drafts) => {
                let mut created = Vec::with_capacity(drafts.len());
                for draft in drafts {
                    created.push(
                        self.create_one_off(destination, draft.description, draft.at)
                            .await?,
                    );
                }
                Ok(created)
            }
            ExtractionResult::Recurring(draft) => Ok(vec![
                self.create_weekly(
                    destination,
                    draft.description,
                    draft.days,
                    draft.hour,
                    draft.minute,
                )
                .await?,
            ]),
        }
    }

    pub async fn create_one_off(
        &self,
        destination: i64,
        description: String,
        at: DateTime<Utc>,
    ) -> Result<Task, ServiceError> {
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(ServiceError::EmptyDescription);
        }

        let now = Utc::now();
        if at <= now {
            return Err(ServiceError::InPast);
        }

        let task = self
            .task_repo
            .add_task(destination, description, Schedule::Once(at))
            .await?;
        let armed = self.engine.arm_all(planner::plan(&task, now), now).await;
        info!(task_id = task.id, destination, armed, "created one-off reminder");
        Ok(task)
    }

    pub async fn create_weekly(
        &self,
        destination: i64,
        description: String,
        mut days: Vec<Weekday>,
        hour: u8,
        minute: u8,
    ) -> Result<Task, ServiceError> {
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(ServiceError::EmptyDescription);
        }
        if days.is_empty() {
            return Err(ServiceError::NoWeekdays);
        }
        if hour > 23 || minute > 59 {
            return Err(ServiceError::InvalidTime { hour, minute });
        }
        normalize_weekdays(&mut days);

        let now = Utc::now();
        let task = self
            .task_repo
            .add_task(destination, description, Schedule::Weekly { days, hour, minute })
            .await?;
        let armed = self.engine.arm_all(planner::plan(&task, now), now).await;
        info!(task_id = task.id, destination, armed, "created weekly reminder");
        Ok(task)
    }

    // === queries ===

    /// All reminders for a destination, in insertion order.
    pub async fn list(&self, destination: i64) -> Vec<Task> {
        self.task_repo.list_for_destination(destination).await
    }

    /// One-off reminders whose fire date on the reference wall clock equals
    /// `now`'s date. Weekly reminders have no calendar date and are
    /// excluded from this view.
    pub async fn list_today(&self, destination: i64, now: DateTime<Utc>) -> Vec<Task> {
        let today = reference_date(now);
        self.task_repo
            .list_for_destination(destination)
            .await
            .into_iter()
            .filter(|task| match &task.schedule {
                Schedule::Once(at) => reference_date(*at) == today,
                Schedule::Weekly { .. } => false,
            })
            .collect()
    }

    // === cancellation ===

    /// Cancel by 1-based position in the destination's current listing.
    /// The ordinal is resolved to the task's stable id first; a task that
    /// disappeared between listing and removal reports `OutOfRange` rather
    /// than removing a neighbour.
    pub async fn cancel(&self, destination: i64, index: usize) -> Result<Task, ServiceError> {
        let tasks = self.task_repo.list_for_destination(destination).await;
        if index == 0 || index > tasks.len() {
            return Err(ServiceError::OutOfRange {
                index,
                count: tasks.len(),
            });
        }

        let task = tasks[index - 1].clone();
        if !self.task_repo.remove_task(task.id).await? {
            return Err(ServiceError::OutOfRange {
                index,
                count: tasks.len().saturating_sub(1),
            });
        }
        let disarmed = self.engine.disarm_task(task.id).await;
        info!(task_id = task.id, destination, disarmed, "cancelled reminder");
        Ok(task)
    }

    /// Remove every reminder for a destination and disarm their events.
    pub async fn clear_all(&self, destination: i64) -> Result<usize, ServiceError> {
        let removed = self.task_repo.remove_all_for_destination(destination).await?;
        for task in &removed {
            self.engine.disarm_task(task.id).await;
        }
        info!(destination, removed = removed.len(), "cleared all reminders");
        Ok(removed.len())
    }
}

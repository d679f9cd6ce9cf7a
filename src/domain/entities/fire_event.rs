use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::domain::entities::task::Task;

/// Which of the graduated alerts an event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStage {
    /// 30 minutes ahead of the reminder instant.
    HalfHour,
    /// 15 minutes ahead.
    QuarterHour,
    /// The reminder instant itself.
    Due,
}

/// A single scheduled notification instant derived from a task.
/// Ephemeral: the timer engine's queue is a rebuildable cache, the task
/// store stays the only source of truth.
#[derive(Debug, Clone)]
pub struct FireEvent {
    pub task_id: u64,
    pub destination: i64,
    pub description: String,
    pub fire_time: DateTime<Utc>,
    pub stage: AlertStage,
    pub is_recurring: bool,
    /// Arming counter, set by the timer engine. Breaks fire-time ties in
    /// insertion order.
    pub seq: u64,
}

impl FireEvent {
    pub fn new(task: &Task, fire_time: DateTime<Utc>, stage: AlertStage) -> Self {
        Self {
            task_id: task.id,
            destination: task.destination,
            description: task.description.clone(),
            fire_time,
            stage,
            is_recurring: task.is_recurring(),
            seq: 0,
        }
    }
}

// ordering for the timer queue: earliest fire time first, FIFO on ties
impl Ord for FireEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fire_time
            .cmp(&other.fire_time)
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for FireEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FireEvent {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.seq == other.seq
    }
}

impl Eq for FireEvent {}

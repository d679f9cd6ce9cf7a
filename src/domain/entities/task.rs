use chrono::{DateTime, Utc, Weekday};

/// A reminder owned by one destination.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Stable identifier assigned by the store when the task is appended
    /// (or re-loaded from disk). User-facing ordinals are resolved to this
    /// id before any mutation.
    pub id: u64,
    pub destination: i64,
    pub description: String,
    pub schedule: Schedule,
}

/// The two ways a reminder is bound to time.
#[derive(Debug, Clone, PartialEq)]
pub enum Schedule {
    /// A single absolute instant.
    Once(DateTime<Utc>),
    /// A time-of-day on a set of weekdays, interpreted in the reference
    /// timezone and re-armed every cycle.
    Weekly {
        days: Vec<Weekday>,
        hour: u8,
        minute: u8,
    },
}

impl Task {
    pub fn new(id: u64, destination: i64, description: String, schedule: Schedule) -> Self {
        Self {
            id,
            destination,
            description,
            schedule,
        }
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self.schedule, Schedule::Weekly { .. })
    }
}

//! Flat-file persistence for the task store.
//!
//! Layout: a JSON array of `{destination, description, time, repeat?}`.
//! `time` is an ISO-8601 timestamp (reference-timezone offset) for one-off
//! reminders and `"HH:MM"` for weekly ones; `repeat` holds the weekday set
//! and its absence marks a one-off. Writes go to a sibling temp file that
//! is renamed over the store, so a failed write leaves the old contents.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::entities::task::{Schedule, Task};
use crate::domain::repositories::task_repository::StoreError;
use crate::domain::value_objects::reference_time::{parse_time_of_day, to_reference};
use crate::domain::value_objects::weekday_format::WeekdayFormat;

#[derive(Debug, Serialize, Deserialize)]
pub struct StoredTask {
    pub destination: i64,
    pub description: String,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<Vec<String>>,
}

impl StoredTask {
    pub fn from_task(task: &Task) -> Self {
        let (time, repeat) = match &task.schedule {
            Schedule::Once(at) => (to_reference(*at).to_rfc3339(), None),
            Schedule::Weekly { days, hour, minute } => (
                format!("{:02}:{:02}", hour, minute),
                Some(days.iter().map(|d| d.to_short_en().to_string()).collect()),
            ),
        };
        Self {
            destination: task.destination,
            description: task.description.clone(),
            time,
            repeat,
        }
    }

    pub fn schedule(&self) -> Result<Schedule, StoreError> {
        match &self.repeat {
            None => {
                let at = DateTime::parse_from_rfc3339(&self.time).map_err(|e| {
                    StoreError::Corrupt(format!("bad one-off timestamp {:?}: {}", self.time, e))
                })?;
                Ok(Schedule::Once(at.with_timezone(&Utc)))
            }
            Some(names) => {
                let (hour, minute) = parse_time_of_day(&self.time).ok_or_else(|| {
                    StoreError::Corrupt(format!("bad weekly time {:?}", self.time))
                })?;
                let mut days = Vec::with_capacity(names.len());
                for name in names {
                    let day = <Weekday as WeekdayFormat>::from_str(name).ok_or_else(|| {
                        StoreError::Corrupt(format!("bad weekday {:?}", name))
                    })?;
                    days.push(day);
                }
                if days.is_empty() {
                    return Err(StoreError::Corrupt("weekly task with empty weekday set".into()));
                }
                Ok(Schedule::Weekly { days, hour, minute })
            }
        }
    }
}

pub fn save_tasks(tasks: &[Task], path: &Path) -> Result<(), StoreError> {
    let records: Vec<StoredTask> = tasks.iter().map(StoredTask::from_task).collect();
    let json = serde_json::to_string_pretty(&records)
        .map_err(|e| StoreError::Io(format!("serializing store: {}", e)))?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json.as_bytes())
        .map_err(|e| StoreError::Io(format!("writing {}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path)
        .map_err(|e| StoreError::Io(format!("replacing {}: {}", path.display(), e)))?;
    Ok(())
}

/// A missing file is an empty store; an unreadable or unparsable one is an
/// error, never silently discarded.
pub fn load_tasks(path: &Path) -> Result<Vec<StoredTask>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)
        .map_err(|e| StoreError::Io(format!("reading {}: {}", path.display(), e)))?;
    serde_json::from_str(&data)
        .map_err(|e| StoreError::Corrupt(format!("parsing {}: {}", path.display(), e)))
}

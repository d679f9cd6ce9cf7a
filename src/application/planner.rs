use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};

use crate::domain::entities::fire_event::{AlertStage, FireEvent};
use crate::domain::entities::task::{Schedule, Task};
use crate::domain::value_objects::reference_time::REFERENCE_TZ;

/// Graduated pre-alert offsets in minutes, furthest out first.
const PRE_ALERTS: [(i64, AlertStage); 2] = [
    (30, AlertStage::HalfHour),
    (15, AlertStage::QuarterHour),
];

/// Derive the fire events for one task, ascending by fire time.
///
/// One-off: only the members of {T-30m, T-15m, T} strictly after `now`
/// survive; an empty result means the whole window has passed and the task
/// is consumed. Weekly: the next wall-clock occurrence strictly after
/// `now` with all three stages; the timer engine drops any stage already
/// behind the clock when arming, so none fires late.
pub fn plan(task: &Task, now: DateTime<Utc>) -> Vec<FireEvent> {
    match &task.schedule {
        Schedule::Once(at) => {
            let mut events = Vec::with_capacity(3);
            for (minutes, stage) in PRE_ALERTS {
                let fire_time = *at - Duration::minutes(minutes);
                if fire_time > now {
                    events.push(FireEvent::new(task, fire_time, stage));
                }
            }
            if *at > now {
                events.push(FireEvent::new(task, *at, AlertStage::Due));
            }
            events
        }
        Schedule::Weekly { days, hour, minute } => {
            let Some(occurrence) = next_weekly_occurrence(days, *hour, *minute, now) else {
                return Vec::new();
            };
            let mut events = Vec::with_capacity(3);
            for (minutes, stage) in PRE_ALERTS {
                events.push(FireEvent::new(
                    task,
                    occurrence - Duration::minutes(minutes),
                    stage,
                ));
            }
            events.push(FireEvent::new(task, occurrence, AlertStage::Due));
            events
        }
    }
}

/// Next occurrence of `hour:minute` on the reference wall clock falling on
/// any day in `days`, strictly after `now`. Scans at most a week ahead, so
/// the same weekday next week is reached when today's time has passed.
pub fn next_weekly_occurrence(
    days: &[Weekday],
    hour: u8,
    minute: u8,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if days.is_empty() {
        return None;
    }

    let local_now = now.with_timezone(&REFERENCE_TZ);
    let mut date = local_now.date_naive();

    for _ in 0..=7 {
        if days.contains(&date.weekday()) {
            let naive = date.and_hms_opt(hour as u32, minute as u32, 0)?;
            // a DST gap can erase the wall-clock time on one date; skip it
            if let Some(candidate) = REFERENCE_TZ.from_local_datetime(&naive).earliest() {
                let candidate = candidate.with_timezone(&Utc);
                if candidate > now {
                    return Some(candidate);
                }
            }
        }
        date = date.succ_opt()?;
    }
    None
}

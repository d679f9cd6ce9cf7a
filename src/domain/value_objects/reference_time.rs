use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// All user-visible wall-clock times (weekly times of day, the "today"
/// view, the persisted one-off timestamps) are interpreted in this zone.
pub const REFERENCE_TZ: Tz = chrono_tz::Europe::Moscow;

pub fn to_reference(t: DateTime<Utc>) -> DateTime<Tz> {
    t.with_timezone(&REFERENCE_TZ)
}

/// Calendar date of an instant on the reference wall clock.
pub fn reference_date(t: DateTime<Utc>) -> NaiveDate {
    to_reference(t).date_naive()
}

/// Parse "HH:MM" into a valid time of day.
pub fn parse_time_of_day(s: &str) -> Option<(u8, u8)> {
    let (h, m) = s.split_once(':')?;
    let hour: u8 = h.parse().ok()?;
    let minute: u8 = m.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

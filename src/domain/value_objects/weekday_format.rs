use chrono::Weekday;

/// String forms for weekdays as they appear in the store file and in
/// extractor payloads.
pub trait WeekdayFormat {
    fn to_short_en(&self) -> &'static str;
    fn from_str(s: &str) -> Option<Weekday>;
}

impl WeekdayFormat for Weekday {
    fn to_short_en(&self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        }
    }

    /// Accepts full english names and three-letter abbreviations, any case.
    fn from_str(s: &str) -> Option<Weekday> {
        match s.to_lowercase().as_str() {
            "monday" | "mon" => Some(Weekday::Mon),
            "tuesday" | "tue" => Some(Weekday::Tue),
            "wednesday" | "wed" => Some(Weekday::Wed),
            "thursday" | "thu" => Some(Weekday::Thu),
            "friday" | "fri" => Some(Weekday::Fri),
            "saturday" | "sat" => Some(Weekday::Sat),
            "sunday" | "sun" => Some(Weekday::Sun),
            _ => None,
        }
    }
}

/// Sort weekdays Monday..Sunday and drop duplicates.
pub fn normalize_weekdays(days: &mut Vec<Weekday>) {
    days.sort_by_key(|d| d.num_days_from_monday());
    days.dedup();
}

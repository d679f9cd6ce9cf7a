pub mod reference_time;
pub mod weekday_format;

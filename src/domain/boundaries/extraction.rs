use async_trait::async_trait;
use chrono::{DateTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::debug;

use crate::domain::value_objects::reference_time::parse_time_of_day;
use crate::domain::value_objects::weekday_format::{WeekdayFormat, normalize_weekdays};

/// A one-off reminder as described by the extractor, not yet a stored task.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOffDraft {
    pub description: String,
    pub at: DateTime<Utc>,
}

/// A weekly reminder as described by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyDraft {
    pub description: String,
    pub days: Vec<Weekday>,
    pub hour: u8,
    pub minute: u8,
}

/// Outcome of the natural-language extraction boundary, decided once and
/// consumed by exhaustive match.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    /// The extractor could not produce a usable descriptor.
    NoExtraction,
    SingleOneOff(OneOffDraft),
    MultipleOneOff(Vec<OneOffDraft>),
    Recurring(WeeklyDraft),
}

/// Opaque capability that turns free-form text into a time descriptor.
/// `now` is the current instant on the reference wall clock, so the
/// extractor can resolve relative phrases ("in an hour", "tomorrow").
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, text: &str, now: DateTime<Tz>) -> ExtractionResult;
}

// Wire shape of the extractor's structured output. Kept separate from the
// domain enum so a malformed payload decodes to NoExtraction instead of
// surfacing a parse error.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ExtractionPayload {
    OneOff {
        description: String,
        time: String,
    },
    Many {
        items: Vec<OneOffPayload>,
    },
    Recurring {
        description: String,
        time: String,
        days: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
struct OneOffPayload {
    description: String,
    time: String,
}

/// Decode the extractor's raw JSON output. Anything that does not conform
/// to the expected shape lands on `NoExtraction`; the engine never crashes
/// on extractor output.
pub fn decode_payload(raw: &str) -> ExtractionResult {
    let payload: ExtractionPayload = match serde_json::from_str(raw) {
        Ok(p) => p,
        Err(e) => {
            debug!("extractor payload did not parse: {}", e);
            return ExtractionResult::NoExtraction;
        }
    };

    match payload {
        ExtractionPayload::OneOff { description, time } => match parse_instant(&time) {
            Some(at) => ExtractionResult::SingleOneOff(OneOffDraft { description, at }),
            None => ExtractionResult::NoExtraction,
        },
        ExtractionPayload::Many { items } => {
            let mut drafts = Vec::with_capacity(items.len());
            for item in items {
                match parse_instant(&item.time) {
                    Some(at) => drafts.push(OneOffDraft {
                        description: item.description,
                        at,
                    }),
                    None => return ExtractionResult::NoExtraction,
                }
            }
            if drafts.is_empty() {
                return ExtractionResult::NoExtraction;
            }
            ExtractionResult::MultipleOneOff(drafts)
        }
        ExtractionPayload::Recurring {
            description,
            time,
            days,
        } => {
            let Some((hour, minute)) = parse_time_of_day(&time) else {
                return ExtractionResult::NoExtraction;
            };
            let mut weekdays = Vec::with_capacity(days.len());
            for name in &days {
                match <Weekday as WeekdayFormat>::from_str(name) {
                    Some(day) => weekdays.push(day),
                    None => return ExtractionResult::NoExtraction,
                }
            }
            if weekdays.is_empty() {
                return ExtractionResult::NoExtraction;
            }
            normalize_weekdays(&mut weekdays);
            ExtractionResult::Recurring(WeeklyDraft {
                description,
                days: weekdays,
                hour,
                minute,
            })
        }
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

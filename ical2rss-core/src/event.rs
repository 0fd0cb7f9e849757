//! Event types extracted from parsed calendar documents.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// The value of a `DTSTART`/`DTEND` property, preserving its timezone form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    /// `VALUE=DATE`, no time of day
    Date(NaiveDate),
    /// `...Z` suffix
    DateTimeUtc(DateTime<Utc>),
    /// No `Z` and no `TZID`
    DateTimeFloating(NaiveDateTime),
    /// Local time in the zone named by the `TZID` parameter
    DateTimeZoned { datetime: NaiveDateTime, tzid: String },
}

impl EventTime {
    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }
}

/// One `VEVENT` from a calendar document.
///
/// Every field is optional; sparse events still flow through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventComponent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    /// The component re-serialized as calendar text (see `ics::write_component`)
    pub ics: String,
}

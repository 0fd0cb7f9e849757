//! Deriving display and ordering values from an event's fields.
//!
//! The display time and the sort instant come from the same `DTSTART` but are
//! separate values: the display time is local wall-clock time in the
//! configured zone, the sort instant is always UTC. For timezone-aware events
//! the two generally show different clock times.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::event::{EventComponent, EventTime};
use crate::tzid::resolve_tzid;

/// Title used when an event has no `SUMMARY`.
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// Sort instant for events without `DTSTART`: 9999-12-31T23:59:59Z.
///
/// Sorts after every real start and still renders as a four-digit-year
/// RFC 822 date.
pub fn sentinel_instant() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// The values a feed item needs from one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub title: String,
    pub description: String,
    pub display_time: String,
    pub sort_instant: DateTime<Utc>,
}

/// Normalizes events against a fixed display timezone.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    display_tz: Tz,
}

impl Normalizer {
    pub fn new(display_tz: Tz) -> Self {
        Normalizer { display_tz }
    }

    pub fn normalize(&self, event: &EventComponent) -> NormalizedEvent {
        let display_time = self.display_time(event);

        NormalizedEvent {
            title: title(event),
            description: compose_description(&display_time, event),
            display_time,
            sort_instant: sort_instant(event),
        }
    }

    /// `HH:MM` of the start in the display timezone; empty for all-day or
    /// start-less events.
    pub fn display_time(&self, event: &EventComponent) -> String {
        match &event.start {
            Some(start) if !start.is_date() => to_utc(start)
                .with_timezone(&self.display_tz)
                .format("%H:%M")
                .to_string(),
            _ => String::new(),
        }
    }

    pub fn description(&self, event: &EventComponent) -> String {
        compose_description(&self.display_time(event), event)
    }
}

/// `SUMMARY` verbatim, or `UNTITLED_EVENT`.
pub fn title(event: &EventComponent) -> String {
    event
        .summary
        .clone()
        .unwrap_or_else(|| UNTITLED_EVENT.to_string())
}

/// UTC instant used for ordering and `pubDate`.
pub fn sort_instant(event: &EventComponent) -> DateTime<Utc> {
    event.start.as_ref().map(to_utc).unwrap_or_else(sentinel_instant)
}

/// Convert any start value to UTC.
///
/// Dates become midnight UTC, floating times are read as UTC. Windows zone
/// names are accepted as TZIDs. A zoned time with an unknown TZID is read as
/// UTC; one that falls into a DST gap is
/// shifted forward past the gap.
pub fn to_utc(time: &EventTime) -> DateTime<Utc> {
    match time {
        EventTime::Date(d) => d.and_time(chrono::NaiveTime::MIN).and_utc(),
        EventTime::DateTimeUtc(dt) => *dt,
        EventTime::DateTimeFloating(naive) => naive.and_utc(),
        EventTime::DateTimeZoned { datetime, tzid } => match resolve_tzid(tzid) {
            Some(tz) => zoned_to_utc(&tz, datetime),
            None => {
                tracing::warn!(tzid = %tzid, "Unknown TZID, treating time as UTC");
                datetime.and_utc()
            }
        },
    }
}

fn zoned_to_utc(tz: &Tz, datetime: &NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(datetime)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(*datetime + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| datetime.and_utc())
}

/// First paragraph `"<time> Uhr[ / <location>]"` when there is a display
/// time, second paragraph `"/ <description>"` when there is a description.
fn compose_description(display_time: &str, event: &EventComponent) -> String {
    let mut parts = Vec::with_capacity(2);

    if !display_time.is_empty() {
        match event.location.as_deref().filter(|l| !l.is_empty()) {
            Some(location) => parts.push(format!("{display_time} Uhr / {location}")),
            None => parts.push(format!("{display_time} Uhr")),
        }
    }

    if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
        parts.push(format!("/ {description}"));
    }

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn event_starting(start: EventTime) -> EventComponent {
        EventComponent {
            start: Some(start),
            ..Default::default()
        }
    }

    #[test]
    fn test_date_only_start() {
        let event = event_starting(EventTime::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
        let normalized = Normalizer::new(Tz::Europe__Berlin).normalize(&event);

        assert_eq!(
            normalized.sort_instant,
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
        );
        assert_eq!(normalized.display_time, "");
        assert_eq!(normalized.description, "");
    }

    #[test]
    fn test_floating_start_is_utc() {
        let event = event_starting(EventTime::DateTimeFloating(naive(2024, 3, 15, 14, 0)));

        assert_eq!(
            sort_instant(&event),
            Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap()
        );
        assert_eq!(Normalizer::new(Tz::UTC).display_time(&event), "14:00");
        assert_eq!(Normalizer::new(Tz::Europe__Berlin).display_time(&event), "15:00");
    }

    #[test]
    fn test_zoned_start_display_and_sort_differ() {
        let event = event_starting(EventTime::DateTimeZoned {
            datetime: naive(2024, 7, 1, 14, 0),
            tzid: "Europe/Berlin".to_string(),
        });

        assert_eq!(
            sort_instant(&event),
            Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(Normalizer::new(Tz::UTC).display_time(&event), "12:00");
        assert_eq!(Normalizer::new(Tz::Europe__Berlin).display_time(&event), "14:00");
    }

    #[test]
    fn test_unknown_tzid_treated_as_utc() {
        let time = EventTime::DateTimeZoned {
            datetime: naive(2024, 3, 15, 9, 30),
            tzid: "Not/A_Zone".to_string(),
        };

        assert_eq!(to_utc(&time), Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_windows_tzid() {
        let time = EventTime::DateTimeZoned {
            datetime: naive(2024, 7, 1, 14, 0),
            tzid: "W. Europe Standard Time".to_string(),
        };

        assert_eq!(to_utc(&time), Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_dst_gap_shifted_forward() {
        // 02:30 on 2024-03-31 does not exist in Europe/Berlin
        let time = EventTime::DateTimeZoned {
            datetime: naive(2024, 3, 31, 2, 30),
            tzid: "Europe/Berlin".to_string(),
        };

        assert_eq!(to_utc(&time), Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap());
    }

    #[test]
    fn test_missing_start_gets_sentinel() {
        let event = EventComponent::default();

        assert_eq!(sort_instant(&event), sentinel_instant());
        assert_eq!(
            sentinel_instant(),
            Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap()
        );
        assert_eq!(Normalizer::new(Tz::UTC).display_time(&event), "");
    }

    #[test]
    fn test_description_time_location_and_text() {
        let event = EventComponent {
            start: Some(EventTime::DateTimeFloating(naive(2024, 3, 15, 14, 0))),
            location: Some("Hall A".to_string()),
            description: Some("Bring ID".to_string()),
            ..Default::default()
        };

        assert_eq!(
            Normalizer::new(Tz::UTC).description(&event),
            "14:00 Uhr / Hall A\n\n/ Bring ID"
        );
    }

    #[test]
    fn test_description_time_only() {
        let event = EventComponent {
            start: Some(EventTime::DateTimeUtc(
                Utc.with_ymd_and_hms(2024, 3, 15, 8, 5, 0).unwrap(),
            )),
            location: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(Normalizer::new(Tz::UTC).description(&event), "08:05 Uhr");
    }

    #[test]
    fn test_description_text_only_for_all_day_event() {
        let event = EventComponent {
            start: Some(EventTime::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())),
            location: Some("Hall A".to_string()),
            description: Some("All day".to_string()),
            ..Default::default()
        };

        assert_eq!(Normalizer::new(Tz::UTC).description(&event), "/ All day");
    }

    #[test]
    fn test_title_fallback() {
        let titled = EventComponent {
            summary: Some("Concert".to_string()),
            ..Default::default()
        };

        assert_eq!(title(&titled), "Concert");
        assert_eq!(title(&EventComponent::default()), UNTITLED_EVENT);
    }
}

//! ICS document parsing using the icalendar crate's parser.

use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};

use super::text::unescape_text;
use super::vtimezone::{Timezones, collect_timezones};
use super::write::write_component;
use crate::error::{ParseError, ParseResult};
use crate::event::{EventComponent, EventTime};
use crate::tzid::resolve_tzid;

/// Parse one calendar block and return its events in document order.
///
/// Events are collected from the whole component tree, not only from the
/// top level of the calendar. Component and property names match
/// case-insensitively.
pub fn parse_calendar(block: &str) -> ParseResult<Vec<EventComponent>> {
    let unfolded = unfold(block);
    check_structure(&unfolded)?;

    let calendar = read_calendar(&unfolded).map_err(|e| ParseError::Syntax(one_line(&e)))?;
    let zones = collect_timezones(&calendar.components);

    let mut events = Vec::new();
    collect_events(&calendar.components, &zones, &mut events);
    Ok(events)
}

/// Verify that `BEGIN`/`END` lines nest properly inside a single
/// `VCALENDAR` and nothing but blank lines follows it.
pub fn check_structure(content: &str) -> ParseResult<()> {
    let mut open: Vec<String> = Vec::new();
    let mut closed = false;

    for line in content.lines().map(|l| l.trim_end_matches('\r')) {
        if line.trim().is_empty() {
            continue;
        }
        if closed {
            return Err(ParseError::TrailingContent(line.to_string()));
        }

        if let Some(name) = strip_prefix_ignore_case(line, "BEGIN:") {
            let name = name.trim().to_ascii_uppercase();
            if open.is_empty() && name != "VCALENDAR" {
                return Err(ParseError::MissingCalendarStart);
            }
            open.push(name);
        } else if let Some(name) = strip_prefix_ignore_case(line, "END:") {
            let name = name.trim().to_ascii_uppercase();
            match open.pop() {
                Some(expected) if expected == name => closed = open.is_empty(),
                Some(expected) => return Err(ParseError::MismatchedEnd { expected, found: name }),
                None => return Err(ParseError::UnexpectedEnd(name)),
            }
        } else if open.is_empty() {
            return Err(ParseError::MissingCalendarStart);
        }
    }

    match open.pop() {
        Some(name) => Err(ParseError::Unterminated(name)),
        None if closed => Ok(()),
        None => Err(ParseError::MissingCalendarStart),
    }
}

/// Parser errors span several lines; diagnostics are logged on one.
fn one_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &line[prefix.len()..])
}

/// First property called `name`, ignoring case.
pub(super) fn find_prop<'c, 'a>(component: &'c Component<'a>, name: &str) -> Option<&'c Property<'a>> {
    component
        .properties
        .iter()
        .find(|p| p.name.as_str().eq_ignore_ascii_case(name))
}

fn collect_events(components: &[Component<'_>], zones: &Timezones, events: &mut Vec<EventComponent>) {
    for component in components {
        if component.name.as_str().eq_ignore_ascii_case("VEVENT") {
            events.push(to_event(component, zones));
        } else {
            collect_events(&component.components, zones, events);
        }
    }
}

fn to_event(vevent: &Component<'_>, zones: &Timezones) -> EventComponent {
    let text = |name: &str| find_prop(vevent, name).map(|p| unescape_text(p.val.as_str()));
    let time = |name: &str| {
        find_prop(vevent, name)
            .and_then(parse_event_time)
            .map(|t| apply_block_timezone(t, zones))
    };

    let mut ics = String::new();
    write_component(vevent, &mut ics);

    EventComponent {
        uid: find_prop(vevent, "UID").map(|p| p.val.to_string()),
        summary: text("SUMMARY"),
        description: text("DESCRIPTION"),
        location: text("LOCATION"),
        start: time("DTSTART"),
        end: time("DTEND"),
        ics,
    }
}

/// A present but unreadable date property counts as absent.
fn parse_event_time(prop: &Property<'_>) -> Option<EventTime> {
    match DatePerhapsTime::try_from(prop) {
        Ok(dpt) => Some(with_tzid_param(to_event_time(dpt), prop)),
        Err(_) => {
            let name: &str = prop.name.as_ref();
            tracing::warn!(
                property = name,
                value = %prop.val.to_string(),
                "Ignoring unparseable date value"
            );
            None
        }
    }
}

/// The icalendar conversion only sees an upper-case `TZID` key.
fn with_tzid_param(time: EventTime, prop: &Property<'_>) -> EventTime {
    let tzid = prop
        .params
        .iter()
        .find(|p| p.key.as_str().eq_ignore_ascii_case("TZID"))
        .and_then(|p| p.val.as_ref())
        .map(|v| v.as_str().to_string());

    match (time, tzid) {
        (EventTime::DateTimeFloating(datetime), Some(tzid)) => {
            EventTime::DateTimeZoned { datetime, tzid }
        }
        (time, _) => time,
    }
}

/// A `TZID` that no known zone matches but the block itself defines is
/// converted with the block's `VTIMEZONE` rules.
fn apply_block_timezone(time: EventTime, zones: &Timezones) -> EventTime {
    match time {
        EventTime::DateTimeZoned { datetime, tzid } if resolve_tzid(&tzid).is_none() => {
            match zones.get(tzid.trim()) {
                Some(zone) => {
                    tracing::debug!(tzid = %tzid, "Using VTIMEZONE definition");
                    EventTime::DateTimeUtc(zone.to_utc(datetime))
                }
                None => EventTime::DateTimeZoned { datetime, tzid },
            }
        }
        time => time,
    }
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving timezone info
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            CalendarDateTime::WithTimezone { date_time, tzid } => EventTime::DateTimeZoned {
                datetime: date_time,
                tzid,
            },
        },
    }
}

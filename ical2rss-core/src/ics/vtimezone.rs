//! Offset rules from a calendar's own `VTIMEZONE` components.
//!
//! Only used for `TZID`s that `chrono-tz` does not know. Observance rules are
//! evaluated for the common yearly form (`FREQ=YEARLY;BYMONTH=..;BYDAY=..`)
//! plus explicit `RDATE`s.

use std::collections::HashMap;

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday,
};
use icalendar::parser::Component;

use super::parse::find_prop;

/// Block-local zone definitions keyed by `TZID`.
pub type Timezones = HashMap<String, VTimezone>;

/// A `STANDARD` or `DAYLIGHT` sub-component.
#[derive(Debug, Clone, PartialEq)]
struct Observance {
    /// Seconds east of UTC before the onset
    offset_from: i32,
    /// Seconds east of UTC from the onset on
    offset_to: i32,
    /// First onset, local time
    dtstart: NaiveDateTime,
    rule: Option<YearlyRule>,
    rdates: Vec<NaiveDateTime>,
}

/// `FREQ=YEARLY;BYMONTH=m;BYDAY=nWD[;UNTIL=..]`
#[derive(Debug, Clone, PartialEq)]
struct YearlyRule {
    month: u32,
    ordinal: i32,
    weekday: Weekday,
    until: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VTimezone {
    observances: Vec<Observance>,
}

/// Gather every `VTIMEZONE` in `components`, at any depth.
pub fn collect_timezones(components: &[Component<'_>]) -> Timezones {
    let mut zones = Timezones::new();
    gather(components, &mut zones);
    zones
}

fn gather(components: &[Component<'_>], zones: &mut Timezones) {
    for component in components {
        if component.name.as_str().eq_ignore_ascii_case("VTIMEZONE") {
            let tzid = find_prop(component, "TZID").map(|p| p.val.as_str().trim().to_string());
            match (tzid, VTimezone::from_component(component)) {
                (Some(tzid), Some(zone)) => {
                    zones.insert(tzid, zone);
                }
                (tzid, _) => {
                    tracing::debug!(tzid = ?tzid, "Ignoring unusable VTIMEZONE");
                }
            }
        } else {
            gather(&component.components, zones);
        }
    }
}

impl VTimezone {
    /// `None` unless the component has at least one readable observance.
    pub fn from_component(component: &Component<'_>) -> Option<Self> {
        let observances: Vec<_> = component
            .components
            .iter()
            .filter(|c| {
                let name = c.name.as_str();
                name.eq_ignore_ascii_case("STANDARD") || name.eq_ignore_ascii_case("DAYLIGHT")
            })
            .filter_map(parse_observance)
            .collect();

        (!observances.is_empty()).then_some(VTimezone { observances })
    }

    /// UTC instant of `local`, using the offset in effect at that wall-clock time.
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        (local - Duration::seconds(i64::from(self.offset_at(local)))).and_utc()
    }

    /// Offset in seconds east of UTC at `local`. Before the first onset the
    /// earliest observance's `TZOFFSETFROM` applies.
    pub fn offset_at(&self, local: NaiveDateTime) -> i32 {
        self.observances
            .iter()
            .filter_map(|o| latest_onset(o, local).map(|onset| (onset, o.offset_to)))
            .max_by_key(|(onset, _)| *onset)
            .map(|(_, offset)| offset)
            .or_else(|| {
                self.observances
                    .iter()
                    .min_by_key(|o| o.dtstart)
                    .map(|o| o.offset_from)
            })
            .unwrap_or(0)
    }
}

fn parse_observance(component: &Component<'_>) -> Option<Observance> {
    let offset = |name: &str| find_prop(component, name).and_then(|p| parse_offset(p.val.as_str()));

    Some(Observance {
        offset_from: offset("TZOFFSETFROM")?,
        offset_to: offset("TZOFFSETTO")?,
        dtstart: find_prop(component, "DTSTART").and_then(|p| parse_local(p.val.as_str()))?,
        rule: find_prop(component, "RRULE").and_then(|p| parse_rule(p.val.as_str())),
        rdates: component
            .properties
            .iter()
            .filter(|p| p.name.as_str().eq_ignore_ascii_case("RDATE"))
            .flat_map(|p| p.val.as_str().split(',').filter_map(parse_local).collect::<Vec<_>>())
            .collect(),
    })
}

/// Most recent onset of `observance` at or before `local`.
fn latest_onset(observance: &Observance, local: NaiveDateTime) -> Option<NaiveDateTime> {
    if local < observance.dtstart {
        return None;
    }

    let from_rdates = observance.rdates.iter().copied().filter(|d| *d <= local);
    let from_rule = observance.rule.iter().flat_map(|rule| {
        let time = observance.dtstart.time();
        let last_year = match rule.until {
            Some(until) if until < local => until.year(),
            _ => local.year(),
        };
        [last_year - 1, last_year]
            .into_iter()
            .filter_map(move |year| rule.onset_in(year, time))
            .filter(move |onset| rule.until.is_none_or(|until| *onset <= until))
    });

    std::iter::once(observance.dtstart)
        .chain(from_rdates)
        .chain(from_rule.filter(|onset| *onset >= observance.dtstart && *onset <= local))
        .max()
}

impl YearlyRule {
    fn onset_in(&self, year: i32, time: NaiveTime) -> Option<NaiveDateTime> {
        nth_weekday_of_month(year, self.month, self.weekday, self.ordinal).map(|d| d.and_time(time))
    }
}

/// `n`-th `weekday` of the month; negative `n` counts from the end.
fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: i32) -> Option<NaiveDate> {
    if n > 0 {
        let n = u8::try_from(n).ok()?;
        NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
    } else if n < 0 {
        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
        let back = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
        let day = last - Duration::days(i64::from(back)) + Duration::weeks(i64::from(n + 1));
        (day.month() == month).then_some(day)
    } else {
        None
    }
}

fn parse_rule(value: &str) -> Option<YearlyRule> {
    let parts: HashMap<String, &str> = value
        .split(';')
        .filter_map(|part| part.split_once('='))
        .map(|(k, v)| (k.trim().to_ascii_uppercase(), v.trim()))
        .collect();

    if !parts.get("FREQ")?.eq_ignore_ascii_case("YEARLY") {
        return None;
    }

    let month = parts.get("BYMONTH")?.parse().ok()?;
    let (ordinal, weekday) = parse_byday(parts.get("BYDAY")?)?;
    let until = parts.get("UNTIL").and_then(|u| parse_local(u));

    Some(YearlyRule {
        month,
        ordinal,
        weekday,
        until,
    })
}

/// `-1SU`, `2SU`, `+1MO`
fn parse_byday(value: &str) -> Option<(i32, Weekday)> {
    let split = value.len().checked_sub(2)?;
    let (ordinal, day) = (value.get(..split)?, value.get(split..)?);

    let weekday = match day.to_ascii_uppercase().as_str() {
        "MO" => Weekday::Mon,
        "TU" => Weekday::Tue,
        "WE" => Weekday::Wed,
        "TH" => Weekday::Thu,
        "FR" => Weekday::Fri,
        "SA" => Weekday::Sat,
        "SU" => Weekday::Sun,
        _ => return None,
    };

    Some((ordinal.trim_start_matches('+').parse().ok()?, weekday))
}

/// `+0200`, `-0500`, `+053000`
fn parse_offset(value: &str) -> Option<i32> {
    let value = value.trim();
    let (sign, digits) = match value.get(..1)? {
        "+" => (1, &value[1..]),
        "-" => (-1, &value[1..]),
        _ => return None,
    };
    if !(digits.len() == 4 || digits.len() == 6) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[0..2].parse().ok()?;
    let minutes: i32 = digits[2..4].parse().ok()?;
    let seconds: i32 = digits.get(4..6).map_or(Ok(0), |s| s.parse::<i32>()).ok()?;

    Some(sign * (hours * 3600 + minutes * 60 + seconds))
}

/// Date-time in basic format; a trailing `Z` is ignored.
fn parse_local(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().trim_end_matches(['Z', 'z']);
    NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y%m%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

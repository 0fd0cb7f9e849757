//! End-to-end conversion from calendar text to RSS XML.

use chrono_tz::Tz;

use crate::error::{FeedResult, ParseError};
use crate::event::EventComponent;
use crate::feed::{Channel, Feed, FeedItem, ITEM_LINK};
use crate::guid::{GuidMode, event_guid};
use crate::ics::parse_calendar;
use crate::normalize::{Normalizer, sort_instant};
use crate::order::order_events;
use crate::split::split_calendars;

/// Everything a run needs besides its input.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub channel: Channel,
    pub guid_mode: GuidMode,
    /// Zone the `HH:MM` in item descriptions is shown in
    pub display_tz: Tz,
}

impl Default for FeedOptions {
    fn default() -> Self {
        FeedOptions {
            channel: Channel::default(),
            guid_mode: GuidMode::default(),
            display_tz: Tz::UTC,
        }
    }
}

/// Events gathered from every block that parsed, plus the failures of the
/// blocks that did not.
#[derive(Debug, Default)]
pub struct Collected {
    pub events: Vec<EventComponent>,
    /// Zero-based block index and reason
    pub failures: Vec<(usize, ParseError)>,
}

/// Split `input` and parse every block. A failing block is logged and
/// skipped; it never affects the other blocks.
pub fn collect_events(input: &str) -> Collected {
    let mut collected = Collected::default();

    for (index, block) in split_calendars(input).enumerate() {
        match parse_calendar(&block) {
            Ok(events) => {
                tracing::debug!(block = index, events = events.len(), "Parsed calendar block");
                collected.events.extend(events);
            }
            Err(e) => {
                tracing::warn!(block = index, error = %e, "Error processing calendar block");
                collected.failures.push((index, e));
            }
        }
    }

    collected
}

/// Build the ordered feed for `events`.
pub fn build_feed(events: Vec<EventComponent>, options: &FeedOptions) -> Feed {
    let normalizer = Normalizer::new(options.display_tz);

    let mut keyed: Vec<_> = events
        .into_iter()
        .map(|event| {
            let instant = sort_instant(&event);
            (event, instant)
        })
        .collect();
    order_events(&mut keyed);

    let mut feed = Feed::new(options.channel.clone());
    feed.items = keyed
        .iter()
        .map(|(event, instant)| {
            let normalized = normalizer.normalize(event);
            FeedItem {
                title: normalized.title,
                description: normalized.description,
                link: ITEM_LINK.to_string(),
                guid: event_guid(event, options.guid_mode),
                pub_date: *instant,
            }
        })
        .collect();

    feed
}

/// Convert concatenated calendar documents into RSS XML.
pub fn convert(input: &str, options: &FeedOptions) -> FeedResult<String> {
    let collected = collect_events(input);

    tracing::debug!(
        events = collected.events.len(),
        failed_blocks = collected.failures.len(),
        display_tz = %options.display_tz,
        "Collected events"
    );

    build_feed(collected.events, options).to_xml()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const INPUT: &str = indoc! {"
        BEGIN:VCALENDAR
        VERSION:2.0
        BEGIN:VEVENT
        UID:later
        SUMMARY:Later
        DTSTART:20240320T100000Z
        END:VEVENT
        END:VCALENDAR
        BEGIN:VCALENDAR
        VERSION:2.0
        BEGIN:VEVENT
        UID:earlier
        SUMMARY:Earlier
        DTSTART:20240310T100000Z
        END:VEVENT
        END:VCALENDAR
    "};

    #[test]
    fn test_collect_events_across_blocks() {
        let collected = collect_events(INPUT);

        assert!(collected.failures.is_empty());
        let uids: Vec<_> = collected.events.iter().filter_map(|e| e.uid.as_deref()).collect();
        assert_eq!(uids, vec!["later", "earlier"]);
    }

    #[test]
    fn test_build_feed_orders_items() {
        let feed = build_feed(collect_events(INPUT).events, &FeedOptions::default());

        let titles: Vec<_> = feed.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Earlier", "Later"]);
        assert!(feed.items.iter().all(|i| i.link == ITEM_LINK));
    }

    #[test]
    fn test_item_link_ignores_channel_link() {
        let options = FeedOptions {
            channel: Channel {
                link: "https://events.example.org".to_string(),
                ..Channel::default()
            },
            ..FeedOptions::default()
        };

        let feed = build_feed(collect_events(INPUT).events, &options);

        assert_eq!(feed.channel.link, "https://events.example.org");
        assert!(feed.items.iter().all(|i| i.link == "https://example.com"));
    }

    #[test]
    fn test_convert_empty_input() {
        let xml = convert("", &FeedOptions::default()).unwrap();

        assert!(xml.contains("<title>Termine</title>"));
        assert!(!xml.contains("<item>"));
    }
}

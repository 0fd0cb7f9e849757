//! Core pipeline for ical2rss.
//!
//! Turns a stream of concatenated iCalendar documents into an RSS 2.0 feed:
//! - `split` partitions the input into candidate `VCALENDAR` blocks
//! - `ics` parses each block and extracts its `VEVENT` components
//! - `tzid` maps `TZID` values (IANA or Windows names) onto zones
//! - `normalize` derives display time, sort instant, title and description
//! - `guid` computes per-event identifiers
//! - `order` sorts events chronologically
//! - `feed` builds and serializes the RSS document

pub mod error;
pub mod event;
pub mod feed;
pub mod guid;
pub mod ics;
pub mod normalize;
pub mod order;
pub mod pipeline;
pub mod split;
pub mod tzid;

pub use error::{FeedError, FeedResult, ParseError, ParseResult};
pub use event::{EventComponent, EventTime};
pub use feed::{Channel, Feed, FeedItem};
pub use guid::GuidMode;
pub use normalize::Normalizer;
pub use pipeline::{Collected, FeedOptions, build_feed, collect_events, convert};

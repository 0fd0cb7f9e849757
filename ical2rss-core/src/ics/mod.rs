//! ICS parsing and canonical re-serialization.
//!
//! Parsing goes through the icalendar crate's parser; each block is checked
//! for balanced `BEGIN`/`END` lines first so truncated documents are rejected
//! as a whole instead of yielding partial events.

mod parse;
mod text;
mod vtimezone;
mod write;

pub use parse::{check_structure, parse_calendar};
pub use text::unescape_text;
pub use vtimezone::{Timezones, VTimezone, collect_timezones};
pub use write::write_component;

//! Splitting an input stream into candidate calendar documents.

/// Marker that opens every calendar document.
pub const CALENDAR_START: &str = "BEGIN:VCALENDAR";

/// Split `input` on every `BEGIN:VCALENDAR` and re-attach the marker.
///
/// Text before the first marker can't be a document and is discarded, as are
/// fragments that are empty or whitespace-only after the marker.
pub fn split_calendars(input: &str) -> impl Iterator<Item = String> + '_ {
    input
        .split(CALENDAR_START)
        .skip(1)
        .filter(|fragment| !fragment.trim().is_empty())
        .map(|fragment| format!("{CALENDAR_START}{fragment}"))
}

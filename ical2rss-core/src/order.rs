//! Chronological ordering of events gathered from all documents.

use chrono::{DateTime, Utc};

/// Sort ascending by instant. The sort is stable, so events sharing an
/// instant keep their encounter order.
pub fn order_events<T>(events: &mut [(T, DateTime<Utc>)]) {
    events.sort_by_key(|(_, instant)| *instant);
}

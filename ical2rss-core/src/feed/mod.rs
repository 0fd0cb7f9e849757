//! RSS 2.0 feed model and rendering.

mod render;

use chrono::{DateTime, Utc};

pub use render::{pretty_print, render_compact};

use crate::error::FeedResult;

pub const DEFAULT_CHANNEL_TITLE: &str = "Termine";
pub const DEFAULT_CHANNEL_LINK: &str = "https://example.com";
pub const DEFAULT_CHANNEL_DESCRIPTION: &str = "Terminkalender";

/// Link written on every item.
pub const ITEM_LINK: &str = DEFAULT_CHANNEL_LINK;

/// Channel-level metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Default for Channel {
    fn default() -> Self {
        Channel {
            title: DEFAULT_CHANNEL_TITLE.to_string(),
            link: DEFAULT_CHANNEL_LINK.to_string(),
            description: DEFAULT_CHANNEL_DESCRIPTION.to_string(),
        }
    }
}

/// One `<item>`, projected from an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub description: String,
    pub link: String,
    /// Written with `isPermaLink="false"`
    pub guid: String,
    pub pub_date: DateTime<Utc>,
}

impl FeedItem {
    /// RFC 822 style date, always in UTC.
    pub fn pub_date_rfc822(&self) -> String {
        self.pub_date.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub channel: Channel,
    pub items: Vec<FeedItem>,
}

impl Feed {
    pub fn new(channel: Channel) -> Self {
        Feed {
            channel,
            items: Vec::new(),
        }
    }

    /// Serialize, re-read and indent the document, dropping blank lines.
    pub fn to_xml(&self) -> FeedResult<String> {
        let compact = render_compact(self)?;
        let pretty = pretty_print(&compact)?;

        Ok(pretty
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_pub_date_format() {
        let item = FeedItem {
            title: String::new(),
            description: String::new(),
            link: ITEM_LINK.to_string(),
            guid: String::new(),
            pub_date: Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap(),
        };

        assert_eq!(item.pub_date_rfc822(), "Tue, 05 Mar 2024 14:07:09 +0000");
    }

    #[test]
    fn test_pub_date_for_sentinel() {
        let item = FeedItem {
            title: String::new(),
            description: String::new(),
            link: ITEM_LINK.to_string(),
            guid: String::new(),
            pub_date: crate::normalize::sentinel_instant(),
        };

        assert_eq!(item.pub_date_rfc822(), "Fri, 31 Dec 9999 23:59:59 +0000");
    }

    #[test]
    fn test_default_channel() {
        let channel = Channel::default();

        assert_eq!(channel.title, "Termine");
        assert_eq!(channel.link, "https://example.com");
        assert_eq!(channel.description, "Terminkalender");
    }
}

//! Per-event GUIDs.

use sha1::{Digest, Sha1};

use crate::event::EventComponent;

/// How item GUIDs are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuidMode {
    /// SHA-1 of the event's calendar text, so unchanged events keep their GUID
    /// across runs.
    #[default]
    ContentHash,
    /// A fresh v4 UUID for every event on every run.
    Random,
}

impl GuidMode {
    pub fn from_random_flag(random: bool) -> Self {
        if random {
            GuidMode::Random
        } else {
            GuidMode::ContentHash
        }
    }
}

pub fn event_guid(event: &EventComponent, mode: GuidMode) -> String {
    match mode {
        GuidMode::Random => uuid::Uuid::new_v4().to_string(),
        GuidMode::ContentHash => content_hash(&event.ics),
    }
}

/// Lowercase hex SHA-1 of `content`.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_with_ics(ics: &str) -> EventComponent {
        EventComponent {
            ics: ics.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_content_hash_known_value() {
        assert_eq!(content_hash(""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(content_hash("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_content_guid_is_stable() {
        let event = event_with_ics("BEGIN:VEVENT\r\nUID:a\r\nEND:VEVENT\r\n");

        let first = event_guid(&event, GuidMode::ContentHash);
        let second = event_guid(&event, GuidMode::ContentHash);

        assert_eq!(first, second);
        assert_eq!(first.len(), 40);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_content_guid_changes_with_content() {
        let a = event_with_ics("BEGIN:VEVENT\r\nUID:a\r\nEND:VEVENT\r\n");
        let b = event_with_ics("BEGIN:VEVENT\r\nUID:b\r\nEND:VEVENT\r\n");

        assert_ne!(
            event_guid(&a, GuidMode::ContentHash),
            event_guid(&b, GuidMode::ContentHash)
        );
    }

    #[test]
    fn test_random_guid_differs_each_call() {
        let event = event_with_ics("BEGIN:VEVENT\r\nUID:a\r\nEND:VEVENT\r\n");

        let first = event_guid(&event, GuidMode::Random);
        let second = event_guid(&event, GuidMode::Random);

        assert_ne!(first, second);
        assert!(uuid::Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(GuidMode::from_random_flag(true), GuidMode::Random);
        assert_eq!(GuidMode::from_random_flag(false), GuidMode::ContentHash);
        assert_eq!(GuidMode::default(), GuidMode::ContentHash);
    }
}

//! Error types for ical2rss.
//!
//! `ParseError` is recoverable: it only drops the calendar block it came from.
//! `FeedError` is fatal: the run aborts without output.

use thiserror::Error;

/// Why a single calendar block could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("block does not start with BEGIN:VCALENDAR")]
    MissingCalendarStart,

    #[error("component {0} is never closed")]
    Unterminated(String),

    #[error("expected END:{expected}, found END:{found}")]
    MismatchedEnd { expected: String, found: String },

    #[error("END:{0} without matching BEGIN")]
    UnexpectedEnd(String),

    #[error("content after END:VCALENDAR: {0}")]
    TrailingContent(String),

    #[error("ICS parse error: {0}")]
    Syntax(String),
}

/// Errors that abort feed generation.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("generated XML is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("character U+{0:04X} cannot be represented in XML")]
    InvalidXmlChar(u32),
}

pub type ParseResult<T> = Result<T, ParseError>;

pub type FeedResult<T> = Result<T, FeedError>;

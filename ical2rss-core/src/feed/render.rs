//! RSS XML serialization.

use std::io::Write;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{Feed, FeedItem};
use crate::error::{FeedError, FeedResult};

/// Serialize `feed` without any whitespace between elements.
pub fn render_compact(feed: &Feed) -> FeedResult<String> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, BytesStart::new("title"), &feed.channel.title)?;
    write_text_element(&mut writer, BytesStart::new("link"), &feed.channel.link)?;
    write_text_element(
        &mut writer,
        BytesStart::new("description"),
        &feed.channel.description,
    )?;

    for item in &feed.items {
        write_item(&mut writer, item)?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let bytes = writer.into_inner();
    Ok(std::str::from_utf8(&bytes)?.to_string())
}

fn write_item<W: Write>(writer: &mut Writer<W>, item: &FeedItem) -> FeedResult<()> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;

    write_text_element(writer, BytesStart::new("title"), &item.title)?;
    write_text_element(writer, BytesStart::new("description"), &item.description)?;
    write_text_element(writer, BytesStart::new("link"), &item.link)?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "false"));
    write_text_element(writer, guid, &item.guid)?;

    write_text_element(writer, BytesStart::new("pubDate"), &item.pub_date_rfc822())?;

    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

/// `<name>text</name>`, or `<name/>` for empty text.
fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    start: BytesStart<'_>,
    text: &str,
) -> FeedResult<()> {
    if text.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::from_escaped(escape_text(text)?)))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

/// Escape markup characters and write line breaks as character references,
/// so a multi-line text never produces a blank line in the output.
fn escape_text(text: &str) -> FeedResult<String> {
    if let Some(c) = text.chars().find(|c| !is_xml_char(*c)) {
        return Err(FeedError::InvalidXmlChar(c as u32));
    }

    Ok(partial_escape(text)
        .replace('\r', "&#13;")
        .replace('\n', "&#10;"))
}

/// The XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r')
        || ('\u{20}'..='\u{D7FF}').contains(&c)
        || ('\u{E000}'..='\u{FFFD}').contains(&c)
        || c >= '\u{10000}'
}

/// Re-read `xml` and write it back with two-space indentation.
///
/// Text and entity references between two tags are written back as a single
/// text node so they stay on the line of their element.
pub fn pretty_print(xml: &str) -> FeedResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Text(t) => text.push_str(std::str::from_utf8(&t)?),
            Event::GeneralRef(r) => {
                text.push('&');
                text.push_str(std::str::from_utf8(&r)?);
                text.push(';');
            }
            event => {
                if !text.is_empty() {
                    let escaped = std::mem::take(&mut text);
                    writer.write_event(Event::Text(BytesText::from_escaped(escaped)))?;
                }
                writer.write_event(event)?;
            }
        }
    }

    let bytes = writer.into_inner();
    Ok(std::str::from_utf8(&bytes)?.to_string())
}

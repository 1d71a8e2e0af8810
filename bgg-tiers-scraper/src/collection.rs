//! Parser for the XML API2 `collection` response.
//!
//! A successful response looks like:
//!
//! ```xml
//! <items totalitems="1">
//!   <item objecttype="thing" objectid="13" subtype="boardgame" collid="1">
//!     <name sortindex="1">Catan</name>
//!     <image>https://cf.geekdo-images.com/original/img/catan.jpg</image>
//!     <thumbnail>https://cf.geekdo-images.com/thumb/img/catan.jpg</thumbnail>
//!     <status own="1" />
//!   </item>
//! </items>
//! ```
//!
//! Failures come back as `<errors><error><message>..</message></error></errors>`
//! or, while a collection is queued, as a bare `<message>` document.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::ScrapeError;
use crate::types::CollectionItem;

/// Parse a collection response body into items, preserving document order.
///
/// `user` is only used to build error messages.
pub fn parse_collection<R: BufRead>(
    reader: R,
    user: &str,
) -> Result<Vec<CollectionItem>, ScrapeError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut items = Vec::new();
    let mut messages = Vec::new();

    let mut saw_items = false;
    let mut current_tag = String::new();
    let mut current_item: Option<CollectionItem> = None;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match tag_name.as_str() {
                    "items" => {
                        saw_items = true;
                        if let Some(total) = attribute(e, b"totalitems")? {
                            log::debug!("Collection reports {} items", total);
                        }
                    }
                    "item" => {
                        current_item = Some(CollectionItem {
                            id: attribute(e, b"objectid")?,
                            ..Default::default()
                        });
                    }
                    _ => current_tag = tag_name,
                }
            }
            Event::Empty(ref e) => match e.name().as_ref() {
                b"items" => saw_items = true,
                b"item" => items.push(CollectionItem {
                    id: attribute(e, b"objectid")?,
                    ..Default::default()
                }),
                _ => {}
            },
            Event::Text(ref e) => {
                let text = e.unescape()?.to_string();
                set_field(&mut current_item, &mut messages, &current_tag, text);
            }
            Event::CData(e) => {
                let text = String::from_utf8_lossy(&e.into_inner()).trim().to_string();
                set_field(&mut current_item, &mut messages, &current_tag, text);
            }
            Event::End(ref e) => {
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current_item.take() {
                        items.push(item);
                    }
                }
                current_tag.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !messages.is_empty() {
        return Err(ScrapeError::unavailable(user, messages.join("; ")));
    }
    if !saw_items {
        return Err(ScrapeError::unavailable(
            user,
            "response did not contain a collection",
        ));
    }

    Ok(items)
}

fn set_field(
    item: &mut Option<CollectionItem>,
    messages: &mut Vec<String>,
    tag: &str,
    text: String,
) {
    if text.is_empty() {
        return;
    }
    match (item.as_mut(), tag) {
        (Some(item), "name") => item.name = Some(text),
        (Some(item), "thumbnail") => item.thumbnail = Some(normalize_url(&text)),
        (Some(item), "image") => item.image = Some(normalize_url(&text)),
        (None, "message") => messages.push(text),
        _ => {}
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, ScrapeError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(String::from_utf8_lossy(&attr.value).to_string()));
        }
    }
    Ok(None)
}

/// Older collection responses use protocol-relative image URLs.
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}

#[cfg(test)]
#[path = "tests/collection_tests.rs"]
mod tests;

//! Torznab XML parsing: the indexer catalog and the search item feed.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::GatewayError;

/// Indexer entry from a `t=indexers` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerEntry {
    pub id: String,
    pub movie: bool,
    pub series: bool,
}

/// Flattened `<item>`: child elements and `torznab:attr` pairs share one map.
pub type FeedItem = HashMap<String, String>;

/// Parse the indexer catalog.
///
/// Movie/series support is derived from top-level `<category id="2000">` and
/// `<category id="5000">` markers under each indexer.
pub fn parse_indexers(xml: &str) -> Result<Vec<IndexerEntry>, GatewayError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut indexers = Vec::new();
    let mut current: Option<IndexerEntry> = None;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"indexers" => saw_root = true,
                b"indexer" => {
                    current = attribute(&e, "id").map(|id| IndexerEntry {
                        id,
                        movie: false,
                        series: false,
                    });
                }
                b"category" => mark_category(&e, current.as_mut()),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"indexer" => {
                    if let Some(id) = attribute(&e, "id") {
                        indexers.push(IndexerEntry {
                            id,
                            movie: false,
                            series: false,
                        });
                    }
                }
                b"category" => mark_category(&e, current.as_mut()),
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"indexer" {
                    if let Some(entry) = current.take() {
                        indexers.push(entry);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(GatewayError::ParseError(e.to_string())),
        }
    }

    if !saw_root {
        return Err(GatewayError::ParseError(
            "missing <indexers> element".to_string(),
        ));
    }

    Ok(indexers)
}

fn mark_category(e: &BytesStart<'_>, entry: Option<&mut IndexerEntry>) {
    let Some(entry) = entry else {
        return;
    };
    match attribute(e, "id").as_deref() {
        Some("2000") => entry.movie = true,
        Some("5000") => entry.series = true,
        _ => {}
    }
}

/// Parse a search feed into flattened items.
///
/// Each `<item>` yields one map. A flat child (`<title>x</title>`) and an
/// attribute pair (`<torznab:attr name="seeders" value="3"/>`) both land in
/// the same map; later values overwrite earlier ones.
pub fn parse_items(xml: &str) -> Result<Vec<FeedItem>, GatewayError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"item" {
                    current = Some(FeedItem::new());
                } else if let Some(item) = current.as_mut() {
                    if is_attr_pair(&e) {
                        insert_attr_pair(&e, item);
                    } else {
                        field = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(item) = current.as_mut() {
                    if is_attr_pair(&e) {
                        insert_attr_pair(&e, item);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(item), Some(name)) = (current.as_mut(), field.as_ref()) {
                    let text = t
                        .unescape()
                        .map_err(|e| GatewayError::ParseError(e.to_string()))?;
                    item.insert(name.clone(), text.into_owned());
                }
            }
            Ok(Event::CData(c)) => {
                if let (Some(item), Some(name)) = (current.as_mut(), field.as_ref()) {
                    item.insert(name.clone(), String::from_utf8_lossy(&c).into_owned());
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(GatewayError::ParseError(e.to_string())),
        }
    }

    Ok(items)
}

fn is_attr_pair(e: &BytesStart<'_>) -> bool {
    e.local_name().as_ref() == b"attr"
}

fn insert_attr_pair(e: &BytesStart<'_>, item: &mut FeedItem) {
    if let (Some(name), Some(value)) = (attribute(e, "name"), attribute(e, "value")) {
        if !name.is_empty() && !value.is_empty() {
            item.insert(name, value);
        }
    }
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .filter_map(Result::ok)
        .find(|a| a.key.as_ref() == key.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Parse an integer field, clamping negatives to zero.
pub fn parse_count(item: &FeedItem, key: &str) -> u32 {
    item.get(key)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|v| v.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

/// Parse a byte size field.
pub fn parse_bytes(item: &FeedItem, key: &str) -> u64 {
    item.get(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

/// Parse a feed date: RSS (RFC 2822) first, then ISO 8601.
pub fn parse_feed_date(date_str: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(date_str)
        .or_else(|_| DateTime::parse_from_rfc3339(date_str))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}

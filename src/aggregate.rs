//! The feed aggregation core.
//!
//! Every data source hands back [`RawItem`]s in whatever shape its upstream
//! API produced.  [`aggregate`] turns a batch of them into a render-ready
//! list: parse timestamps, flatten HTML into plain text, sort newest-first,
//! cap the length.  It is a pure function — all I/O happens in the sources
//! (`crate::source`) before this module is ever involved.
//!
//! ## For contributors
//!
//! If you are adding a new data source you do **not** need to modify this
//! file.  Construct `RawItem` values in your source's `fetch()` and the
//! aggregation, sorting, and rendering all come for free.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Errors produced while fetching or aggregating a feed.
///
/// Neither variant is fatal: a malformed timestamp drops one item, an
/// unavailable source skips one refresh cycle for one column.
#[derive(Debug, Error)]
pub enum FeedError {
    /// An item's published timestamp could not be parsed.  The item is
    /// excluded from the aggregation; the rest of the batch survives.
    #[error("malformed timestamp: {value:?}")]
    MalformedTimestamp { value: String },

    /// A whole source's fetch failed (network, auth, bad payload).  The
    /// column keeps its previous content until the next successful cycle.
    #[error("{source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },
}

/// A source-specific record as it came off the wire.
///
/// Field contents vary by source — `published` might be RFC 2822 from an
/// RSS `pubDate`, RFC 3339 from a video API, or the social API's own
/// format — but every source fills the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    /// Published timestamp, still a string in the source's native format.
    pub published: String,
    /// Headline, post author name, or video title.  May contain markup.
    pub title: String,
    /// Secondary line: article author, handle, or channel name.
    pub author: String,
    /// URL to the full content.
    pub link: String,
    /// Summary or body text.  May contain markup.
    pub summary: Option<String>,
    /// Thumbnail or avatar URL, if the source provides one.
    pub thumbnail: Option<String>,
}

/// A feed entry normalised from any source, ready to render.
///
/// `published_at` is always timezone-aware UTC; sources with naive
/// timestamps are coerced during aggregation so sort order is well defined.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItem {
    pub title: String,
    pub author: String,
    pub link: String,
    /// Plain text — any markup was stripped during normalisation.
    pub summary: String,
    pub thumbnail: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// A recency-sorted, capped list of normalised items.
pub type FeedList = Vec<NormalizedItem>;

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Merge, normalise, sort, and cap a batch of raw items.
///
/// * Items whose timestamp cannot be parsed are dropped, never returned as
///   an error — one bad entry must not blank a whole column.
/// * The sort is newest-first and **stable**: items sharing a timestamp
///   keep their input order across repeated calls.
/// * No de-duplication: if the same item appears twice in `raw_items`,
///   both copies come back.
/// * `max_items == 0` yields an empty list.
pub fn aggregate(raw_items: Vec<RawItem>, max_items: usize) -> FeedList {
    let mut items: Vec<NormalizedItem> = raw_items
        .into_iter()
        .filter_map(|raw| normalize(raw).ok())
        .collect();

    // Vec::sort_by is stable, so equal timestamps keep input order.
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    items.truncate(max_items);
    items
}

fn normalize(raw: RawItem) -> Result<NormalizedItem, FeedError> {
    let published_at = parse_timestamp(&raw.published)?;
    Ok(NormalizedItem {
        title: strip_html(&raw.title),
        author: raw.author,
        link: raw.link,
        summary: raw.summary.as_deref().map(strip_html).unwrap_or_default(),
        thumbnail: raw.thumbnail,
        published_at,
    })
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Date-only and naive datetime layouts tried after the offset-carrying
/// formats.  Naive values are taken as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a source timestamp string into an aware UTC instant.
///
/// Accepts, in order: RFC 2822 (RSS `pubDate`), RFC 3339 (video API),
/// the social API's `created_at` layout (`Wed Oct 10 20:19:24 +0000 2018`),
/// naive ISO-ish datetimes and bare dates (assumed UTC), and integer epoch
/// seconds.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, FeedError> {
    let s = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%a %b %d %H:%M:%S %z %Y") {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(secs) = s.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(secs, 0) {
            return Ok(dt);
        }
    }

    Err(FeedError::MalformedTimestamp {
        value: value.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Excerpt extraction
// ---------------------------------------------------------------------------

/// Cut a readable excerpt out of a markup-laden article summary.
///
/// Some feeds ship the whole article body in `<description>`.  The rule:
/// start at the first `<p>` (or position 0 if there is none), end at the
/// first `</p>` after that point (or the end of the string), then strip the
/// remaining markup.  A heuristic — callers tolerate the occasional
/// over-long excerpt.
pub fn extract_excerpt(summary: &str) -> String {
    let start = summary.find("<p>").unwrap_or(0);
    let end = summary[start..]
        .find("</p>")
        .map(|i| start + i)
        .unwrap_or(summary.len());
    strip_html(&summary[start..end])
}

// ---------------------------------------------------------------------------
// HTML stripping
// ---------------------------------------------------------------------------

/// Longest entity body we accept between `&` and `;` ("#x10FFFF").
const MAX_ENTITY_LEN: usize = 8;

/// Convert HTML markup to plain text.
///
/// Drops tags, decodes the common named and numeric entities, and collapses
/// all runs of whitespace (including embedded line breaks) to single
/// spaces.  A bare `&` that does not introduce an entity ("Fish & chips",
/// "Q&A") is kept as literal text.
pub fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut in_entity = false;
    let mut entity = String::new();

    for ch in html.chars() {
        if in_entity {
            if ch == ';' {
                in_entity = false;
                push_entity(&entity, &mut result);
                continue;
            }
            // Entity bodies are short and alphanumeric (numeric ones carry
            // a # prefix).  Anything else means the & was ordinary text.
            if (ch.is_ascii_alphanumeric() || ch == '#') && entity.len() < MAX_ENTITY_LEN {
                entity.push(ch);
                continue;
            }
            in_entity = false;
            result.push('&');
            result.push_str(&entity);
            // ch still needs ordinary handling below.
        }
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            '&' if !in_tag => {
                in_entity = true;
                entity.clear();
            }
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    // Input ended mid-entity: it was literal text after all.
    if in_entity {
        result.push('&');
        result.push_str(&entity);
    }

    let result: String = result.split_whitespace().collect::<Vec<&str>>().join(" ");
    result.trim().to_string()
}

fn push_entity(entity: &str, result: &mut String) {
    match entity {
        "amp" => result.push('&'),
        "lt" => result.push('<'),
        "gt" => result.push('>'),
        "quot" => result.push('"'),
        "apos" => result.push('\''),
        "nbsp" => result.push(' '),
        _ if entity.starts_with('#') => {
            if let Some(code) = parse_numeric_entity(entity) {
                if let Some(c) = char::from_u32(code) {
                    result.push(c);
                }
            }
        }
        _ => {
            // Unknown entity, keep as-is.
            result.push('&');
            result.push_str(entity);
            result.push(';');
        }
    }
}

/// Parse a numeric HTML entity (e.g. "#123" or "#x7B").
fn parse_numeric_entity(entity: &str) -> Option<u32> {
    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse().ok()
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

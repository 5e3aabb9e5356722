//! RSS 2.0 and Atom feed parsing.
//!
//! Feeds are deserialized with quick-xml's serde support into a small
//! normalized [`FeedEntry`], keeping every field optional so extractors can
//! decide their own fallback text. Namespaced elements (`dc:creator`,
//! `content:encoded`) are matched by local name.

use chrono::{DateTime, FixedOffset, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::http;

/// One item of a syndication feed, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    /// `content:encoded` for RSS, `content` for Atom, else the description.
    pub content: Option<String>,
    pub pub_date: Option<String>,
    pub author: Option<String>,
    /// `dc:creator`.
    pub creator: Option<String>,
    pub guid: Option<String>,
    pub enclosure_url: Option<String>,
    pub categories: Vec<String>,
}

// ── RSS 2.0 ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(alias = "content:encoded")]
    encoded: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    author: Option<String>,
    #[serde(alias = "dc:creator")]
    creator: Option<String>,
    guid: Option<TextNode>,
    enclosure: Option<Enclosure>,
    #[serde(rename = "category")]
    categories: Vec<TextNode>,
}

#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct Enclosure {
    #[serde(rename = "@url")]
    url: Option<String>,
}

impl From<RssItem> for FeedEntry {
    fn from(item: RssItem) -> Self {
        let content = item.encoded.or_else(|| item.description.clone());
        Self {
            title: item.title,
            link: item.link.map(|l| l.trim().to_string()),
            description: item.description,
            content,
            pub_date: item.pub_date,
            author: item.author,
            creator: item.creator,
            guid: item.guid.map(|g| g.value),
            enclosure_url: item.enclosure.and_then(|e| e.url),
            categories: item.categories.into_iter().map(|c| c.value).collect(),
        }
    }
}

// ── Atom ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AtomEntry {
    title: Option<TextNode>,
    #[serde(rename = "link")]
    links: Vec<AtomLink>,
    id: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<TextNode>,
    content: Option<TextNode>,
    author: Option<AtomPerson>,
    #[serde(rename = "category")]
    categories: Vec<AtomCategory>,
}

#[derive(Debug, Default, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AtomPerson {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AtomCategory {
    #[serde(rename = "@term")]
    term: Option<String>,
}

impl From<AtomEntry> for FeedEntry {
    fn from(entry: AtomEntry) -> Self {
        let link = entry
            .links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| entry.links.first())
            .and_then(|l| l.href.clone());
        let description = entry.summary.map(|s| s.value);
        let content = entry
            .content
            .map(|c| c.value)
            .or_else(|| description.clone());
        let author = entry.author.and_then(|a| a.name);
        Self {
            title: entry.title.map(|t| t.value),
            link,
            description,
            content,
            pub_date: entry.published.or(entry.updated),
            author: author.clone(),
            creator: author,
            guid: entry.id,
            enclosure_url: None,
            categories: entry.categories.into_iter().filter_map(|c| c.term).collect(),
        }
    }
}

/// Parse an RSS 2.0 or Atom document into entries, preserving order.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] if the document is not well-formed or has
/// neither an RSS `channel` nor an Atom `feed` root.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, SourceError> {
    let root = root_element(xml)?;
    let entries: Vec<FeedEntry> = match root.as_str() {
        "rss" => {
            let doc: RssDocument = quick_xml::de::from_str(xml)
                .map_err(|e| SourceError::Parse(format!("invalid RSS document: {e}")))?;
            doc.channel.items.into_iter().map(FeedEntry::from).collect()
        }
        "feed" => {
            let doc: AtomFeed = quick_xml::de::from_str(xml)
                .map_err(|e| SourceError::Parse(format!("invalid Atom document: {e}")))?;
            doc.entries.into_iter().map(FeedEntry::from).collect()
        }
        other => {
            return Err(SourceError::Parse(format!(
                "unsupported feed root element <{other}>"
            )))
        }
    };
    tracing::debug!(count = entries.len(), "feed parsed");
    Ok(entries)
}

/// Local name of the first element in the document.
fn root_element(xml: &str) -> Result<String, SourceError> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
            }
            Ok(Event::Eof) => return Err(SourceError::Parse("empty feed document".into())),
            Ok(_) => {}
            Err(e) => return Err(SourceError::Parse(format!("malformed feed: {e}"))),
        }
    }
}

/// Fetch and parse the feed at `url`.
///
/// # Errors
///
/// Transport failures are [`SourceError::Http`]; see [`parse_feed`] for
/// parse failures.
pub async fn fetch_feed(
    config: &SourceConfig,
    url: &str,
    cancel: &CancellationToken,
) -> Result<Vec<FeedEntry>, SourceError> {
    tracing::trace!(url, "fetching feed");
    let body = http::fetch_text(config, url, cancel).await?;
    parse_feed(&body)
}

/// Parse an RFC 2822 (RSS) or RFC 3339 (Atom) timestamp.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
}

/// Format a feed timestamp as `MM/DD/YYYY` in UTC.
pub fn format_month_day_year(raw: &str) -> Option<String> {
    parse_date(raw).map(|d| d.with_timezone(&Utc).format("%m/%d/%Y").to_string())
}

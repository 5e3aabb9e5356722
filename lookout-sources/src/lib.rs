//! # lookout-sources
//!
//! Remote fetchers and extractors for the lookout launcher integrations.
//!
//! Every integration is a thin client for one site: it either fetches a
//! syndication feed or scrapes an HTML search-results page, then
//! normalizes the document into records whose text fields are always
//! printable.
//!
//! ## Design
//!
//! - Feed mode: RSS 2.0 / Atom parsed with quick-xml (Gamekult news,
//!   Gamekyo, Smashing Magazine)
//! - Scrape mode: CSS selectors over the search page (Gamekult games and
//!   articles, Tatoeba, HowLongToBeat details)
//! - JSON mode: HowLongToBeat search through the site's search endpoint
//! - Every request races a [`tokio_util::sync::CancellationToken`] so a
//!   superseded search drops its connection immediately
//! - Missing fields become fallback text ("No Title", "No Date", ...)
//!
//! Extractors are coupled to each site's current markup and are expected
//! to need new selectors when a site is redesigned.

pub mod config;
pub mod error;
pub mod extract;
pub mod feed;
pub mod http;
pub mod source;
pub mod sources;
pub mod types;

pub use config::{SiteUrls, SourceConfig};
pub use error::{Result, SourceError};
pub use feed::FeedEntry;
pub use source::{EmptyQuery, Source};
pub use types::{
    Article, FrontPageNews, Game, GameDetail, GamekultArticle, NewsItem, Record, Sentence,
};

//! Smashing Magazine article feeds, one per category.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::extract::or_fallback;
use crate::feed::{self, FeedEntry};
use crate::source::Source;
use crate::types::{Article, NO_DATE, NO_TITLE};

/// Smashing Magazine feed categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The main feed with every category.
    #[default]
    All,
    Accessibility,
    Coding,
    Css,
    Design,
    Javascript,
    Mobile,
    Ux,
    Wordpress,
}

impl Category {
    /// URL slug used by the category feed path.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Accessibility => "accessibility",
            Self::Coding => "coding",
            Self::Css => "css",
            Self::Design => "design",
            Self::Javascript => "javascript",
            Self::Mobile => "mobile",
            Self::Ux => "ux",
            Self::Wordpress => "wordpress",
        }
    }

    /// Feed path relative to the site root.
    pub fn feed_path(&self) -> String {
        match self {
            Self::All => "/feed/".to_string(),
            other => format!("/category/{}/index.xml", other.slug()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Author name from a feed author field.
///
/// Feeds write `email (Name)`; when a `(` is present the text after the
/// first one is kept with its first `)` removed. Otherwise the field is
/// returned unchanged.
pub fn author_name(raw: &str) -> String {
    match raw.split_once('(') {
        Some((_, rest)) => {
            let inner = rest.split('(').next().unwrap_or_default();
            inner.replacen(')', "", 1)
        }
        None => raw.to_string(),
    }
}

/// The article feed for one category.
pub struct SmashingMagazine {
    config: SourceConfig,
    category: Category,
}

impl SmashingMagazine {
    pub fn new(config: SourceConfig, category: Category) -> Self {
        Self { config, category }
    }

    /// Full feed URL for the configured category.
    pub fn feed_url(&self) -> String {
        format!(
            "{}{}",
            self.config.urls.smashing_magazine,
            self.category.feed_path()
        )
    }
}

impl Source for SmashingMagazine {
    type Record = Article;

    async fn fetch(
        &self,
        _query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<Article>, SourceError> {
        let entries = feed::fetch_feed(&self.config, &self.feed_url(), cancel).await?;
        Ok(articles(entries, &self.config.urls.smashing_magazine))
    }

    fn name(&self) -> &'static str {
        "smashing-magazine"
    }
}

/// Map feed entries to articles. Ids are 1-based feed positions.
pub fn articles(entries: Vec<FeedEntry>, website: &str) -> Vec<Article> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let author = entry
                .author
                .or(entry.creator)
                .map(|a| author_name(&a))
                .unwrap_or_default();
            Article {
                id: (index + 1).to_string(),
                title: or_fallback(entry.title, NO_TITLE),
                description: entry.description.unwrap_or_default(),
                url: or_fallback(entry.link, website),
                date_published: or_fallback(entry.pub_date, NO_DATE),
                author,
            }
        })
        .collect()
}

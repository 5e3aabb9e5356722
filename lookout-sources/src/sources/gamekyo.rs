//! Gamekyo front page news feed.

use tokio_util::sync::CancellationToken;

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::extract::or_fallback;
use crate::feed::{self, FeedEntry};
use crate::source::Source;
use crate::types::{FrontPageNews, NO_DATE, NO_TITLE};

/// The Gamekyo `news.xml` feed.
pub struct GamekyoFrontPage {
    config: SourceConfig,
}

impl GamekyoFrontPage {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    fn feed_url(&self) -> String {
        format!("{}/news.xml", self.config.urls.gamekyo)
    }
}

impl Source for GamekyoFrontPage {
    type Record = FrontPageNews;

    async fn fetch(
        &self,
        _query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<FrontPageNews>, SourceError> {
        let entries = feed::fetch_feed(&self.config, &self.feed_url(), cancel).await?;
        Ok(front_page_news(entries, &self.config.urls.gamekyo))
    }

    fn name(&self) -> &'static str {
        "gamekyo-front-page"
    }
}

/// Map feed entries to front page news. Ids are 1-based feed positions.
pub fn front_page_news(entries: Vec<FeedEntry>, website: &str) -> Vec<FrontPageNews> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| FrontPageNews {
            id: (index + 1).to_string(),
            title: or_fallback(entry.title, NO_TITLE),
            description: entry.description.unwrap_or_default(),
            url: or_fallback(entry.link, website),
            date_published: or_fallback(entry.pub_date, NO_DATE),
        })
        .collect()
}

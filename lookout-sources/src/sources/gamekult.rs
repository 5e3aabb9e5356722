//! Gamekult: news feed, game database search, and article search.
//!
//! The two search pages are scraped with the site's own class names; they
//! will need new selectors whenever Gamekult changes its markup.

use scraper::Html;
use tokio_util::sync::CancellationToken;

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::extract::{
    all_texts, collapse_whitespace, direct_child, first_text, or_fallback, selector, text_of,
};
use crate::feed::{self, FeedEntry};
use crate::http;
use crate::source::{EmptyQuery, Source};
use crate::types::{Game, GamekultArticle, NewsItem, NO_DATE, NO_TITLE_ELLIPSIS};

/// Word preceding the company name in a game card ("Édité par ...").
const COMPANY_KEYWORD: &str = "par";

/// Join a site-relative href onto the base URL. A missing href yields the base.
fn absolute_url(base: &str, href: Option<&str>) -> String {
    match href {
        Some(h) if h.starts_with("http://") || h.starts_with("https://") => h.to_string(),
        Some(h) => format!("{base}{h}"),
        None => base.to_string(),
    }
}

// ── News feed ────────────────────────────────────────────────────────────

/// The Gamekult news feed.
pub struct GamekultNews {
    config: SourceConfig,
}

impl GamekultNews {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    fn feed_url(&self) -> String {
        format!("{}/feed.xml", self.config.urls.gamekult)
    }
}

impl Source for GamekultNews {
    type Record = NewsItem;

    async fn fetch(
        &self,
        _query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<NewsItem>, SourceError> {
        let entries = feed::fetch_feed(&self.config, &self.feed_url(), cancel).await?;
        Ok(news_items(entries, &self.config.urls.gamekult))
    }

    fn name(&self) -> &'static str {
        "gamekult-news"
    }
}

/// Map feed entries to news items, in feed order.
pub fn news_items(entries: Vec<FeedEntry>, website: &str) -> Vec<NewsItem> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let date = entry
                .pub_date
                .as_deref()
                .and_then(feed::format_month_day_year)
                .unwrap_or_else(|| NO_DATE.to_string());
            let id = or_fallback(entry.guid.clone(), &(index + 1).to_string());
            NewsItem {
                id,
                title: or_fallback(entry.title.map(|t| t.trim().to_string()), NO_TITLE_ELLIPSIS),
                link: or_fallback(entry.link, website),
                date,
                content: entry.content.unwrap_or_default(),
                creator: entry.creator.or(entry.author).unwrap_or_default(),
                enclosure_url: entry.enclosure_url,
            }
        })
        .collect()
}

// ── Game search ──────────────────────────────────────────────────────────

/// The Gamekult game database search page.
///
/// An empty query shows nothing rather than fetching.
pub struct GamekultGames {
    config: SourceConfig,
}

impl GamekultGames {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    /// Search URL for a trimmed query.
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/rechercher-jeu.html?q={}",
            self.config.urls.gamekult,
            http::encode_query(query)
        )
    }
}

impl Source for GamekultGames {
    type Record = Game;

    async fn fetch(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<Game>, SourceError> {
        tracing::trace!(query, "Gamekult game search");
        let html = http::fetch_text(&self.config, &self.search_url(query), cancel).await?;
        parse_games_html(&html, &self.config.urls.gamekult)
    }

    fn name(&self) -> &'static str {
        "gamekult-games"
    }

    fn empty_query(&self) -> EmptyQuery {
        EmptyQuery::Skip
    }
}

/// Company name from a "... par <company>" label.
///
/// Trims, collapses whitespace runs, keeps the text after the last `par`.
pub fn company_from_label(label: &str) -> String {
    collapse_whitespace(label.trim())
        .rsplit(COMPANY_KEYWORD)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Parse the game search results page.
pub(crate) fn parse_games_html(html: &str, website: &str) -> Result<Vec<Game>, SourceError> {
    let document = Html::parse_document(html);

    let card_sel = selector(".pr__game-h__mdb__details")?;
    let title_sel = selector(".pr__game-h__mdb__details__title")?;
    let company_sel = selector(".pr__game-h__mdb__details__company")?;
    let media_sel = selector(".pr__platform__tag--link")?;

    let games: Vec<Game> = document
        .select(&card_sel)
        .enumerate()
        .map(|(index, card)| {
            let title = or_fallback(first_text(card, &title_sel), NO_TITLE_ELLIPSIS);
            let href = direct_child(card, "a").and_then(|a| a.value().attr("href"));
            let company = card
                .select(&company_sel)
                .next()
                .map(|el| company_from_label(&el.text().collect::<String>()))
                .unwrap_or_default();
            Game {
                id: format!("{title}-{index}"),
                url: absolute_url(website, href),
                company,
                media: all_texts(card, &media_sel),
                title,
            }
        })
        .collect();

    tracing::debug!(count = games.len(), "Gamekult games parsed");
    Ok(games)
}

// ── Article search ───────────────────────────────────────────────────────

/// The Gamekult article search page. An empty query lists the latest articles.
pub struct GamekultArticles {
    config: SourceConfig,
}

impl GamekultArticles {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    /// Search URL for a trimmed query.
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/rechercher.html?q={}",
            self.config.urls.gamekult,
            http::encode_query(query)
        )
    }
}

impl Source for GamekultArticles {
    type Record = GamekultArticle;

    async fn fetch(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<GamekultArticle>, SourceError> {
        tracing::trace!(query, "Gamekult article search");
        let html = http::fetch_text(&self.config, &self.search_url(query), cancel).await?;
        parse_articles_html(&html, &self.config.urls.gamekult)
    }

    fn name(&self) -> &'static str {
        "gamekult-articles"
    }
}

/// Parse the article search results page.
pub(crate) fn parse_articles_html(
    html: &str,
    website: &str,
) -> Result<Vec<GamekultArticle>, SourceError> {
    let document = Html::parse_document(html);

    let card_sel = selector(".ed__news-h__sm")?;
    let link_sel = selector(".gk__helpers__fat-title-m a")?;
    let description_sel = selector(".gk__helpers__p")?;
    let category_sel = selector(".gk__helpers__category")?;
    let media_sel = selector(".gk__helpers__tag")?;
    let author_sel = selector(".gk__helpers__author")?;

    let articles: Vec<GamekultArticle> = document
        .select(&card_sel)
        .enumerate()
        .map(|(index, card)| {
            let link = card.select(&link_sel).next();
            let title = or_fallback(link.map(text_of), NO_TITLE_ELLIPSIS);
            GamekultArticle {
                id: format!("{title}-{index}"),
                description: first_text(card, &description_sel).unwrap_or_default(),
                url: absolute_url(website, link.and_then(|a| a.value().attr("href"))),
                category: first_text(card, &category_sel).unwrap_or_default(),
                media: all_texts(card, &media_sel),
                author: first_text(card, &author_sel).unwrap_or_default(),
                title,
            }
        })
        .collect();

    tracing::debug!(count = articles.len(), "Gamekult articles parsed");
    Ok(articles)
}

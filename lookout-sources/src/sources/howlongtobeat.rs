//! HowLongToBeat game search and detail lookup.
//!
//! Search goes through the site's JSON endpoint (`POST /api/search`), which
//! answers completion times in seconds. Details scrape `/game?id=<id>`. The
//! page uses generated CSS-module class names
//! (`GameHeader_profile_header__q_PID`), so selectors match on the stable
//! prefix with `[class*=...]`.

use scraper::{ElementRef, Html};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::extract::{or_fallback, selector, text_of};
use crate::http;
use crate::source::{EmptyQuery, Source};
use crate::types::{GameDetail, NO_TITLE};

const PLATFORMS_LABEL: &str = "Platforms:";

/// Results requested per search.
const SEARCH_PAGE_SIZE: u32 = 20;

/// HowLongToBeat detail client.
pub struct HowLongToBeat {
    config: SourceConfig,
}

impl HowLongToBeat {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    /// Public page URL for a game id.
    pub fn game_url(&self, id: &str) -> String {
        format!("{}/game?id={}", self.config.urls.howlongtobeat, http::encode_query(id))
    }

    /// Search endpoint URL.
    pub fn search_url(&self) -> String {
        format!("{}/api/search", self.config.urls.howlongtobeat)
    }

    /// Search games by title. Hits carry times and platforms but no
    /// description; [`HowLongToBeat::detail`] fills that in.
    ///
    /// # Errors
    ///
    /// [`SourceError::Cancelled`], [`SourceError::Http`] for transport or
    /// status failures, [`SourceError::Parse`] for an unexpected body.
    pub async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<GameDetail>, SourceError> {
        tracing::trace!(query, "HowLongToBeat search");
        let base = &self.config.urls.howlongtobeat;
        let url = self.search_url();
        let client = http::build_client(&self.config)?;
        let request = client
            .post(&url)
            .header(reqwest::header::ORIGIN, base.as_str())
            .header(reqwest::header::REFERER, format!("{base}/"));
        let response = http::send_json(request, &url, &search_body(query), cancel)
            .await?
            .error_for_status()
            .map_err(|e| SourceError::Http(e.to_string()))?;
        let body = http::read_text(response, cancel).await?;
        let games = parse_search_json(&body, |id| self.game_url(id), base)?;
        tracing::debug!(count = games.len(), "HowLongToBeat search parsed");
        Ok(games)
    }

    /// Look up one game.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotFound`] when the site answers 404 or the page has
    /// no game header; [`SourceError::Cancelled`] or [`SourceError::Http`]
    /// otherwise.
    pub async fn detail(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<GameDetail, SourceError> {
        tracing::trace!(id, "HowLongToBeat detail lookup");
        let url = self.game_url(id);
        let client = http::build_client(&self.config)?;
        let response = http::send_get(&client, &url, cancel).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(format!("game {id}")));
        }
        let response = response
            .error_for_status()
            .map_err(|e| SourceError::Http(e.to_string()))?;
        let html = http::read_text(response, cancel).await?;
        parse_detail_html(&html, id, &url)?
            .ok_or_else(|| SourceError::NotFound(format!("game {id}")))
    }
}

impl Source for HowLongToBeat {
    type Record = GameDetail;

    async fn fetch(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<GameDetail>, SourceError> {
        self.search(query, cancel).await
    }

    fn name(&self) -> &'static str {
        "howlongtobeat"
    }

    fn empty_query(&self) -> EmptyQuery {
        EmptyQuery::Skip
    }
}

fn search_body(query: &str) -> serde_json::Value {
    serde_json::json!({
        "searchType": "games",
        "searchTerms": query.split_whitespace().collect::<Vec<_>>(),
        "searchPage": 1,
        "size": SEARCH_PAGE_SIZE,
        "searchOptions": {
            "games": {
                "userId": 0,
                "platform": "",
                "sortCategory": "popular",
                "rangeCategory": "main",
                "rangeTime": {"min": 0, "max": 0},
                "gameplay": {"perspective": "", "flow": "", "genre": ""},
                "modifier": ""
            },
            "users": {"sortCategory": "postcount"},
            "filter": "",
            "sort": 0,
            "randomizer": 0
        }
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    game_id: u64,
    #[serde(default)]
    game_name: Option<String>,
    #[serde(default)]
    game_image: Option<String>,
    #[serde(default)]
    comp_main: f64,
    #[serde(default)]
    comp_plus: f64,
    #[serde(default)]
    comp_100: f64,
    #[serde(default)]
    profile_platform: Option<String>,
}

/// Seconds to hours, rounded to the nearest half hour.
fn seconds_to_hours(seconds: f64) -> f64 {
    (seconds / 1800.0).round() / 2.0
}

/// Parse a search response body into games, in result order.
pub(crate) fn parse_search_json(
    body: &str,
    game_url: impl Fn(&str) -> String,
    base: &str,
) -> Result<Vec<GameDetail>, SourceError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::Parse(format!("invalid HowLongToBeat search response: {e}")))?;
    Ok(response
        .data
        .into_iter()
        .map(|hit| {
            let id = hit.game_id.to_string();
            let playable_on = hit
                .profile_platform
                .as_deref()
                .unwrap_or_default()
                .split(", ")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            GameDetail {
                url: game_url(&id),
                name: or_fallback(hit.game_name, NO_TITLE),
                description: String::new(),
                playable_on,
                gameplay_main: seconds_to_hours(hit.comp_main),
                gameplay_main_extra: seconds_to_hours(hit.comp_plus),
                gameplay_completionist: seconds_to_hours(hit.comp_100),
                image_url: hit
                    .game_image
                    .filter(|image| !image.is_empty())
                    .map(|image| format!("{base}/games/{image}")),
                id,
            }
        })
        .collect())
}

/// Hours from a time label such as `"12½ Hours"`, `"45 Mins"` or `"--"`.
pub fn parse_hours(label: &str) -> f64 {
    let label = label.trim();
    let Some(number) = label.split_whitespace().next() else {
        return 0.0;
    };
    let (whole, half) = match number.strip_suffix('½') {
        Some(w) => (w, 0.5),
        None => (number, 0.0),
    };
    let value = if whole.is_empty() {
        half
    } else {
        match whole.parse::<f64>() {
            Ok(v) => v + half,
            Err(_) => return 0.0,
        }
    };
    if label.contains("Min") {
        value / 60.0
    } else {
        value
    }
}

fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text().map(|t| t.to_string()))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parse a game page. `Ok(None)` when the page carries no game.
pub(crate) fn parse_detail_html(
    html: &str,
    id: &str,
    url: &str,
) -> Result<Option<GameDetail>, SourceError> {
    let document = Html::parse_document(html);

    let header_sel = selector("div[class*=GameHeader_profile_header__]")?;
    let image_sel = selector("div[class*=GameHeader_game_image__] img")?;
    let summary_sel = selector("div[class*=GameSummary_large__]")?;
    let info_sel = selector("div[class*=GameSummary_profile_info__]")?;
    let times_sel = selector("div[class*=GameStats_game_times__] li")?;
    let h4_sel = selector("h4")?;
    let h5_sel = selector("h5")?;

    let Some(header) = document.select(&header_sel).next() else {
        return Ok(None);
    };
    let name = own_text(header);
    let name = if name.is_empty() { text_of(header) } else { name };

    let description = document
        .select(&summary_sel)
        .next()
        .map(text_of)
        .unwrap_or_default();

    let playable_on = document
        .select(&info_sel)
        .map(|el| el.text().collect::<String>())
        .find(|text| text.contains(PLATFORMS_LABEL))
        .map(|text| {
            text.replace('\n', "")
                .replacen(PLATFORMS_LABEL, "", 1)
                .trim()
                .split(", ")
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut detail = GameDetail {
        id: id.to_string(),
        name,
        description,
        playable_on,
        gameplay_main: 0.0,
        gameplay_main_extra: 0.0,
        gameplay_completionist: 0.0,
        image_url: document
            .select(&image_sel)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string),
        url: url.to_string(),
    };

    for row in document.select(&times_sel) {
        let label = row.select(&h4_sel).next().map(text_of).unwrap_or_default();
        let hours = row
            .select(&h5_sel)
            .next()
            .map(|el| parse_hours(&text_of(el)))
            .unwrap_or(0.0);
        if label.starts_with("Main Story")
            || label.starts_with("Single-Player")
            || label.starts_with("Solo")
        {
            detail.gameplay_main = hours;
        } else if label.starts_with("Main + Sides")
            || label.starts_with("Main + Extras")
            || label.starts_with("Co-Op")
        {
            detail.gameplay_main_extra = hours;
        } else if label.starts_with("Completionist") || label.starts_with("Vs.") {
            detail.gameplay_completionist = hours;
        }
    }

    tracing::debug!(id, name = %detail.name, "HowLongToBeat detail parsed");
    Ok(Some(detail))
}

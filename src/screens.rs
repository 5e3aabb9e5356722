//! Screen catalog: which source backs each screen and how it behaves.
//!
//! A screen is a [`SearchSession`] plus the display layer from
//! [`crate::detail`]. The host opens screens by [`ScreenKind`] and talks to
//! them through the object-safe [`ScreenHandle`], so it never needs to know
//! the record type behind a screen.

use std::fmt;
use std::sync::Arc;

use lookout_sources::sources::{
    Category, GamekultArticles, GamekultGames, GamekultNews, GamekyoFrontPage, HowLongToBeat,
    SmashingMagazine, Tatoeba,
};
use lookout_sources::{Record, Source, SourceError};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::LookoutConfig;
use crate::detail::{Describe, DetailView, ListRow};
use crate::error::Result;
use crate::presenter::{Presenter, SessionStatus, Snapshot, Toast};
use crate::session::{FailureMode, SearchSession, SessionOptions};

/// Every screen the host can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    GamekultNews,
    GamekultGames,
    GamekultArticles,
    GamekyoFrontPage,
    SmashingMagazine,
    Tatoeba,
    #[serde(rename = "howlongtobeat")]
    HowLongToBeat,
}

impl ScreenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GamekultNews => "gamekult_news",
            Self::GamekultGames => "gamekult_games",
            Self::GamekultArticles => "gamekult_articles",
            Self::GamekyoFrontPage => "gamekyo_front_page",
            Self::SmashingMagazine => "smashing_magazine",
            Self::Tatoeba => "tatoeba",
            Self::HowLongToBeat => "howlongtobeat",
        }
    }

    /// Failure handling when the config does not override it.
    pub fn default_failure(self) -> FailureMode {
        match self {
            Self::GamekyoFrontPage | Self::SmashingMagazine => FailureMode::Fallback,
            _ => FailureMode::Notify,
        }
    }

    /// Title of this screen's failure toasts.
    pub fn toast_title(self) -> &'static str {
        match self {
            Self::GamekultNews => "Could not parse news",
            Self::GamekyoFrontPage => "Could not load front page news",
            Self::SmashingMagazine => "Could not load articles",
            Self::GamekultGames
            | Self::GamekultArticles
            | Self::Tatoeba
            | Self::HowLongToBeat => "Could not perform search",
        }
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render-ready state of a screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenState {
    pub screen: ScreenKind,
    pub query_text: String,
    pub is_loading: bool,
    pub status: SessionStatus,
    pub rows: Vec<ListRow>,
}

/// Receiver of screen output. Implemented by the host bridge.
pub trait ScreenSink: Send + Sync + 'static {
    fn state(&self, state: &ScreenState);
    fn toast(&self, screen: ScreenKind, toast: &Toast);
}

/// Adapts a [`ScreenSink`] to the record-typed [`Presenter`] a session needs.
struct SinkPresenter {
    kind: ScreenKind,
    sink: Arc<dyn ScreenSink>,
}

impl<R: Describe> Presenter<R> for SinkPresenter {
    fn publish(&self, snapshot: &Snapshot<R>) {
        self.sink.state(&ScreenState {
            screen: self.kind,
            query_text: snapshot.query_text.clone(),
            is_loading: snapshot.is_loading,
            status: snapshot.status,
            rows: snapshot.results.iter().map(Describe::row).collect(),
        });
    }

    fn notify(&self, toast: &Toast) {
        self.sink.toast(self.kind, toast);
    }
}

/// An open screen, independent of its record type.
pub trait ScreenHandle: Send + Sync {
    fn kind(&self) -> ScreenKind;

    /// Forward a search-bar edit to the session.
    fn query_change(&self, text: &str) -> Option<JoinHandle<()>>;

    /// Detail view for a record in the current results.
    fn select(&self, id: &str, language: &str) -> DetailView;

    fn dispose(&self);
}

struct Screen<S>
where
    S: Source,
    S::Record: Describe,
{
    kind: ScreenKind,
    session: SearchSession<S, SinkPresenter>,
}

impl<S> ScreenHandle for Screen<S>
where
    S: Source,
    S::Record: Describe,
{
    fn kind(&self) -> ScreenKind {
        self.kind
    }

    fn query_change(&self, text: &str) -> Option<JoinHandle<()>> {
        self.session.on_query_change(text)
    }

    fn select(&self, id: &str, language: &str) -> DetailView {
        self.session
            .snapshot()
            .results
            .iter()
            .find(|record| record.id() == id)
            .map(|record| record.detail(language))
            .unwrap_or_else(DetailView::item_not_found)
    }

    fn dispose(&self) {
        self.session.dispose();
    }
}

fn mount<S>(
    kind: ScreenKind,
    source: S,
    config: &LookoutConfig,
    sink: Arc<dyn ScreenSink>,
) -> Box<dyn ScreenHandle>
where
    S: Source,
    S::Record: Describe,
{
    let overrides = config.screen(kind);
    let options = SessionOptions {
        empty_query: overrides.empty_query.unwrap_or(source.empty_query()),
        failure: overrides.failure.unwrap_or(kind.default_failure()),
        toast_title: kind.toast_title().to_string(),
    };
    tracing::debug!(screen = %kind, ?options, "opening screen");
    let session = SearchSession::create(source, SinkPresenter { kind, sink }, options);
    session.mount();
    Box::new(Screen { kind, session })
}

/// Open and mount a screen. `category` only applies to Smashing Magazine.
///
/// Must be called from within a tokio runtime.
pub fn open_screen(
    kind: ScreenKind,
    category: Option<Category>,
    config: &LookoutConfig,
    sink: Arc<dyn ScreenSink>,
) -> Box<dyn ScreenHandle> {
    let sources = config.sources.clone();
    match kind {
        ScreenKind::GamekultNews => mount(kind, GamekultNews::new(sources), config, sink),
        ScreenKind::GamekultGames => mount(kind, GamekultGames::new(sources), config, sink),
        ScreenKind::GamekultArticles => mount(kind, GamekultArticles::new(sources), config, sink),
        ScreenKind::GamekyoFrontPage => mount(kind, GamekyoFrontPage::new(sources), config, sink),
        ScreenKind::SmashingMagazine => mount(
            kind,
            SmashingMagazine::new(sources, category.unwrap_or_default()),
            config,
            sink,
        ),
        ScreenKind::Tatoeba => mount(kind, Tatoeba::new(sources), config, sink),
        ScreenKind::HowLongToBeat => mount(kind, HowLongToBeat::new(sources), config, sink),
    }
}

/// HowLongToBeat detail view for a game id.
///
/// A game the site does not know renders the "cannot be found" placeholder;
/// `name` is the title shown while navigating, falling back to the id.
///
/// # Errors
///
/// Transport and parse failures are returned as [`crate::LookoutError::Source`].
pub async fn game_detail(
    config: &LookoutConfig,
    id: &str,
    name: Option<&str>,
    cancel: &CancellationToken,
) -> Result<DetailView> {
    let client = HowLongToBeat::new(config.sources.clone());
    match client.detail(id, cancel).await {
        Ok(game) => {
            let mut view = game.detail("");
            if let Some(name) = name {
                view.navigation_title = name.to_string();
            }
            Ok(view)
        }
        Err(SourceError::NotFound(_)) => {
            tracing::debug!(id, "game not found");
            Ok(DetailView::game_not_found(
                name.unwrap_or(id),
                client.game_url(id),
            ))
        }
        Err(e) => Err(e.into()),
    }
}

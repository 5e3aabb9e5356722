//! Search session: the per-screen query controller.
//!
//! A [`SearchSession`] turns search-bar edits into remote fetches and keeps
//! the host's view consistent with the latest query only:
//!
//! - every query change cancels the outstanding fetch and bumps a
//!   generation counter
//! - a completion is applied only while its generation is current
//! - cancellation is silent; other failures follow the screen's
//!   [`FailureMode`]
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! await. Presenter calls are made while the lock is held so snapshots reach
//! the host in state order.

use std::sync::{Arc, Mutex, MutexGuard};

use lookout_sources::{EmptyQuery, Source, SourceError};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::presenter::{Presenter, SessionStatus, Snapshot, Toast};

/// What a screen shows when a fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Keep the previous results and toast the title with the error text.
    Notify,
    /// Clear the results and toast the title only. The error is logged.
    Fallback,
    /// Clear the results and only log.
    Silent,
}

/// Per-screen session behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub empty_query: EmptyQuery,
    pub failure: FailureMode,
    /// Title of failure toasts.
    pub toast_title: String,
}

impl SessionOptions {
    /// Options using the source's own empty-query behavior.
    pub fn for_source<S: Source>(
        source: &S,
        failure: FailureMode,
        toast_title: impl Into<String>,
    ) -> Self {
        Self {
            empty_query: source.empty_query(),
            failure,
            toast_title: toast_title.into(),
        }
    }
}

struct State<R> {
    generation: u64,
    cancel: Option<CancellationToken>,
    disposed: bool,
    snapshot: Snapshot<R>,
}

struct Shared<R, P> {
    state: Mutex<State<R>>,
    presenter: P,
    options: SessionOptions,
    source_name: &'static str,
}

impl<R: Clone, P: Presenter<R>> Shared<R, P> {
    fn lock(&self) -> MutexGuard<'_, State<R>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply the outcome of the fetch started at `generation`.
    fn complete(&self, generation: u64, outcome: Result<Vec<R>, SourceError>) {
        let mut state = self.lock();
        if state.disposed || state.generation != generation {
            tracing::trace!(
                source = self.source_name,
                generation,
                current = state.generation,
                "dropping stale result"
            );
            return;
        }

        match outcome {
            Ok(records) => {
                tracing::debug!(
                    source = self.source_name,
                    count = records.len(),
                    "search completed"
                );
                state.cancel = None;
                state.snapshot.results = records;
                state.snapshot.is_loading = false;
                state.snapshot.status = SessionStatus::Loaded;
                self.presenter.publish(&state.snapshot);
            }
            Err(e) if e.is_cancelled() => {
                tracing::trace!(source = self.source_name, generation, "search cancelled");
            }
            Err(e) => {
                tracing::warn!(source = self.source_name, error = %e, "search failed");
                state.cancel = None;
                state.snapshot.is_loading = false;
                state.snapshot.status = SessionStatus::Failed;
                let toast = match self.options.failure {
                    FailureMode::Notify => Some(Toast::failure(
                        self.options.toast_title.clone(),
                        Some(e.to_string()),
                    )),
                    FailureMode::Fallback => {
                        state.snapshot.results.clear();
                        Some(Toast::failure(self.options.toast_title.clone(), None))
                    }
                    FailureMode::Silent => {
                        state.snapshot.results.clear();
                        None
                    }
                };
                self.presenter.publish(&state.snapshot);
                if let Some(toast) = toast {
                    self.presenter.notify(&toast);
                }
            }
        }
    }
}

/// Query controller for one screen.
pub struct SearchSession<S: Source, P: Presenter<S::Record>> {
    source: Arc<S>,
    shared: Arc<Shared<S::Record, P>>,
}

impl<S: Source, P: Presenter<S::Record>> SearchSession<S, P> {
    /// Create an idle session. Nothing is fetched until [`mount`](Self::mount).
    pub fn create(source: S, presenter: P, options: SessionOptions) -> Self {
        let source_name = source.name();
        Self {
            source: Arc::new(source),
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    generation: 0,
                    cancel: None,
                    disposed: false,
                    snapshot: Snapshot {
                        query_text: String::new(),
                        is_loading: true,
                        status: SessionStatus::Idle,
                        results: Vec::new(),
                    },
                }),
                presenter,
                options,
                source_name,
            }),
        }
    }

    /// Issue the initial empty query.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(&self) -> Option<JoinHandle<()>> {
        self.on_query_change("")
    }

    /// React to a search-bar edit.
    ///
    /// Returns the handle of the spawned fetch, or `None` when no fetch was
    /// started (skipped empty query, or a disposed session). Must be called
    /// from within a tokio runtime.
    pub fn on_query_change(&self, text: &str) -> Option<JoinHandle<()>> {
        let query = text.trim().to_string();
        let mut state = self.shared.lock();
        if state.disposed {
            return None;
        }

        if let Some(previous) = state.cancel.take() {
            previous.cancel();
        }
        state.generation += 1;
        let generation = state.generation;
        state.snapshot.query_text = query.clone();

        if query.is_empty() && self.shared.options.empty_query == EmptyQuery::Skip {
            state.snapshot.results.clear();
            state.snapshot.is_loading = false;
            state.snapshot.status = SessionStatus::Loaded;
            self.shared.presenter.publish(&state.snapshot);
            return None;
        }

        let token = CancellationToken::new();
        state.cancel = Some(token.clone());
        state.snapshot.is_loading = true;
        state.snapshot.status = SessionStatus::Loading;
        self.shared.presenter.publish(&state.snapshot);
        drop(state);

        tracing::trace!(
            source = self.shared.source_name,
            query = %query,
            generation,
            "search started"
        );
        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.shared);
        Some(tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                () = token.cancelled() => Err(SourceError::Cancelled),
                result = source.fetch(&query, &token) => result,
            };
            shared.complete(generation, outcome);
        }))
    }

    /// Current visible state.
    pub fn snapshot(&self) -> Snapshot<S::Record> {
        self.shared.lock().snapshot.clone()
    }

    /// Cancel any outstanding fetch. Later completions and query changes are
    /// ignored. Idempotent.
    pub fn dispose(&self) {
        let mut state = self.shared.lock();
        if state.disposed {
            return;
        }
        state.disposed = true;
        if let Some(token) = state.cancel.take() {
            token.cancel();
        }
        tracing::debug!(source = self.shared.source_name, "session disposed");
    }
}

impl<S: Source, P: Presenter<S::Record>> Drop for SearchSession<S, P> {
    fn drop(&mut self) {
        self.dispose();
    }
}

//! Host command channel and router for launcher shell integrations.
//!
//! The router owns at most one open screen. Screen output (state snapshots
//! and failure toasts) is emitted as [`EventEnvelope`]s on a broadcast
//! channel; command results come back as [`ResponseEnvelope`]s.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::LookoutConfig;
use crate::error::{LookoutError, Result};
use crate::host::contract::{
    CommandEnvelope, CommandName, EVENT_SESSION_STATE, EVENT_TOAST, EventEnvelope,
    GameDetailPayload, ItemSelectPayload, ResponseEnvelope, ScreenOpenPayload, SearchQueryPayload,
};
use crate::presenter::Toast;
use crate::screens::{self, ScreenHandle, ScreenKind, ScreenSink, ScreenState};

/// Forwards screen output onto the event broadcast channel.
struct EventSink {
    event_tx: broadcast::Sender<EventEnvelope>,
}

impl EventSink {
    fn emit(&self, event: &str, payload: serde_json::Value) {
        // No subscribers is not an error: the host may not be listening yet.
        let _ = self.event_tx.send(EventEnvelope::new(event, payload));
    }
}

impl ScreenSink for EventSink {
    fn state(&self, state: &ScreenState) {
        match serde_json::to_value(state) {
            Ok(payload) => self.emit(EVENT_SESSION_STATE, payload),
            Err(e) => tracing::error!(error = %e, "failed to serialize screen state"),
        }
    }

    fn toast(&self, screen: ScreenKind, toast: &Toast) {
        self.emit(
            EVENT_TOAST,
            serde_json::json!({
                "screen": screen,
                "style": toast.style,
                "title": toast.title,
                "message": toast.message,
            }),
        );
    }
}

struct HostCommandRequest {
    envelope: CommandEnvelope,
    response_tx: oneshot::Sender<ResponseEnvelope>,
}

#[derive(Clone)]
pub struct HostCommandClient {
    request_tx: mpsc::Sender<HostCommandRequest>,
    event_tx: broadcast::Sender<EventEnvelope>,
}

impl HostCommandClient {
    /// Dispatch one command and wait for its response.
    ///
    /// # Errors
    ///
    /// Returns [`LookoutError::Protocol`] for an invalid envelope and
    /// [`LookoutError::Channel`] when the server is gone.
    pub async fn send(&self, envelope: CommandEnvelope) -> Result<ResponseEnvelope> {
        envelope.validate().map_err(|e| {
            LookoutError::Protocol(format!(
                "invalid host command envelope {}: {}",
                envelope.request_id, e
            ))
        })?;

        let (response_tx, response_rx) = oneshot::channel();
        self.request_tx
            .send(HostCommandRequest {
                envelope,
                response_tx,
            })
            .await
            .map_err(|e| {
                LookoutError::Channel(format!("failed to send host command request: {e}"))
            })?;

        response_rx
            .await
            .map_err(|e| LookoutError::Channel(format!("host command response dropped: {e}")))
    }

    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.event_tx.subscribe()
    }
}

/// Outcome of routing one command.
///
/// Commands that touch the network answer from their own task so the router
/// keeps serving while they run.
pub enum Reply {
    Ready(ResponseEnvelope),
    Pending(JoinHandle<ResponseEnvelope>),
}

impl Reply {
    /// Wait for the response.
    pub async fn into_response(self, request_id: &str) -> ResponseEnvelope {
        match self {
            Self::Ready(response) => response,
            Self::Pending(handle) => handle.await.unwrap_or_else(|e| {
                ResponseEnvelope::error(request_id, format!("command task failed: {e}"))
            }),
        }
    }
}

pub struct HostCommandServer {
    request_rx: mpsc::Receiver<HostCommandRequest>,
    sink: Arc<EventSink>,
    config: LookoutConfig,
    screen: Option<Box<dyn ScreenHandle>>,
    /// Cancels the in-flight `game.detail` lookup.
    detail_cancel: Option<CancellationToken>,
}

#[must_use]
pub fn command_channel(
    request_capacity: usize,
    event_capacity: usize,
    config: LookoutConfig,
) -> (HostCommandClient, HostCommandServer) {
    let (event_tx, _event_rx) = broadcast::channel(event_capacity.max(1));
    let (request_tx, request_rx) = mpsc::channel(request_capacity.max(1));

    (
        HostCommandClient {
            request_tx,
            event_tx: event_tx.clone(),
        },
        HostCommandServer {
            request_rx,
            sink: Arc::new(EventSink { event_tx }),
            config,
            screen: None,
            detail_cancel: None,
        },
    )
}

impl HostCommandServer {
    /// Serve requests until every client is dropped or `runtime.stop` is
    /// answered.
    pub async fn run(mut self) {
        while let Some(request) = self.request_rx.recv().await {
            let HostCommandRequest {
                envelope,
                response_tx,
            } = request;
            let is_stop = envelope.command == CommandName::RuntimeStop;
            match self.route(&envelope) {
                Ok(Reply::Ready(response)) => {
                    let _ = response_tx.send(response);
                }
                Ok(reply @ Reply::Pending(_)) => {
                    let request_id = envelope.request_id;
                    tokio::spawn(async move {
                        let _ = response_tx.send(reply.into_response(&request_id).await);
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        command = envelope.command.as_str(),
                        error = %e,
                        "host command failed"
                    );
                    let _ = response_tx.send(ResponseEnvelope::error(
                        envelope.request_id,
                        e.to_string(),
                    ));
                }
            }
            if is_stop {
                tracing::debug!("runtime.stop answered; host command server exiting");
                break;
            }
        }
        self.close_screen();
        self.cancel_detail();
    }

    /// Route a command envelope to the appropriate handler.
    pub fn route(&mut self, envelope: &CommandEnvelope) -> Result<Reply> {
        let response = match envelope.command {
            CommandName::HostPing => ResponseEnvelope::ok(
                envelope.request_id.clone(),
                serde_json::json!({"pong": true}),
            ),
            CommandName::ScreenOpen => self.handle_screen_open(envelope)?,
            CommandName::SearchQuery => self.handle_search_query(envelope)?,
            CommandName::ItemSelect => self.handle_item_select(envelope)?,
            CommandName::GameDetail => return self.handle_game_detail(envelope),
            CommandName::ScreenClose => {
                self.cancel_detail();
                let closed = self.close_screen();
                ResponseEnvelope::ok(
                    envelope.request_id.clone(),
                    serde_json::json!({"closed": closed}),
                )
            }
            CommandName::RuntimeStop => {
                self.cancel_detail();
                self.close_screen();
                ResponseEnvelope::ok(
                    envelope.request_id.clone(),
                    serde_json::json!({"accepted": true}),
                )
            }
        };
        Ok(Reply::Ready(response))
    }

    fn handle_screen_open(&mut self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let payload: ScreenOpenPayload = parse_payload(envelope)?;
        self.close_screen();
        let sink: Arc<dyn ScreenSink> = Arc::clone(&self.sink) as Arc<dyn ScreenSink>;
        let screen = screens::open_screen(payload.screen, payload.category, &self.config, sink);
        tracing::info!(screen = %payload.screen, "screen opened");
        self.screen = Some(screen);
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"screen": payload.screen}),
        ))
    }

    fn handle_search_query(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let payload: SearchQueryPayload = parse_payload(envelope)?;
        let screen = self.active_screen(envelope)?;
        let started = screen.query_change(&payload.text).is_some();
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::json!({"accepted": true, "fetching": started}),
        ))
    }

    fn handle_item_select(&self, envelope: &CommandEnvelope) -> Result<ResponseEnvelope> {
        let payload: ItemSelectPayload = parse_payload(envelope)?;
        let screen = self.active_screen(envelope)?;
        let view = screen.select(&payload.id, payload.language.as_deref().unwrap_or_default());
        Ok(ResponseEnvelope::ok(
            envelope.request_id.clone(),
            serde_json::to_value(view).map_err(|e| LookoutError::Protocol(e.to_string()))?,
        ))
    }

    /// Start a HowLongToBeat lookup, superseding any lookup still running.
    fn handle_game_detail(&mut self, envelope: &CommandEnvelope) -> Result<Reply> {
        let payload: GameDetailPayload = parse_payload(envelope)?;
        self.cancel_detail();
        let cancel = CancellationToken::new();
        self.detail_cancel = Some(cancel.clone());

        let config = self.config.clone();
        let request_id = envelope.request_id.clone();
        let handle = tokio::spawn(async move {
            let view = screens::game_detail(&config, &payload.id, payload.name.as_deref(), &cancel)
                .await
                .and_then(|view| {
                    serde_json::to_value(view).map_err(|e| LookoutError::Protocol(e.to_string()))
                });
            match view {
                Ok(view) => ResponseEnvelope::ok(request_id, view),
                Err(e) => {
                    if matches!(&e, LookoutError::Source(source) if source.is_cancelled()) {
                        tracing::debug!(id = %payload.id, "game detail lookup cancelled");
                    } else {
                        tracing::warn!(id = %payload.id, error = %e, "game detail lookup failed");
                    }
                    ResponseEnvelope::error(request_id, e.to_string())
                }
            }
        });
        Ok(Reply::Pending(handle))
    }

    fn cancel_detail(&mut self) {
        if let Some(cancel) = self.detail_cancel.take() {
            cancel.cancel();
        }
    }

    fn active_screen(&self, envelope: &CommandEnvelope) -> Result<&dyn ScreenHandle> {
        self.screen.as_deref().ok_or_else(|| {
            LookoutError::Protocol(format!(
                "{} requires an open screen",
                envelope.command.as_str()
            ))
        })
    }

    /// Dispose the open screen, if any. Returns whether one was open.
    fn close_screen(&mut self) -> bool {
        match self.screen.take() {
            Some(screen) => {
                screen.dispose();
                tracing::info!(screen = %screen.kind(), "screen closed");
                true
            }
            None => false,
        }
    }
}

fn parse_payload<T: DeserializeOwned>(envelope: &CommandEnvelope) -> Result<T> {
    serde_json::from_value(envelope.payload.clone()).map_err(|e| {
        LookoutError::Protocol(format!("invalid {} payload: {e}", envelope.command.as_str()))
    })
}

//! Shared HTTP plumbing for feed fetches and search-page scraping.
//!
//! Provides a configured [`reqwest::Client`] with rotating browser
//! User-Agents, form-style query encoding, and GET helpers that race the
//! transport against a [`CancellationToken`]. Dropping the in-flight
//! reqwest future on cancellation closes the connection, so no network
//! resource outlives a superseded search.

use std::time::Duration;

use rand::seq::SliceRandom;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::config::SourceConfig;
use crate::error::SourceError;

/// Realistic browser User-Agent strings, rotated per client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] for one fetch.
///
/// The timeout is only applied when configured; otherwise the transport
/// default (no overall deadline) is kept.
///
/// # Errors
///
/// Returns [`SourceError::Http`] if the client cannot be constructed.
pub fn build_client(config: &SourceConfig) -> Result<reqwest::Client, SourceError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    let mut builder = reqwest::Client::builder()
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10));
    if let Some(secs) = config.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder
        .build()
        .map_err(|e| SourceError::Http(format!("failed to build HTTP client: {e}")))
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // SAFETY: USER_AGENTS is a non-empty const array, choose only returns None on empty slices
        .unwrap_or(USER_AGENTS[0])
}

/// Encode search text for a query string: spaces become `+`, everything
/// else outside the unreserved set is percent-encoded.
pub fn encode_query(text: &str) -> String {
    url::form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

/// Send a GET request, returning the response whatever its status.
///
/// # Errors
///
/// [`SourceError::Cancelled`] if `cancel` fires first, otherwise
/// [`SourceError::Http`] on transport failure.
pub async fn send_get(
    client: &reqwest::Client,
    url: &str,
    cancel: &CancellationToken,
) -> Result<reqwest::Response, SourceError> {
    send(client.get(url), url, cancel).await
}

/// POST `body` as JSON, returning the response whatever its status.
///
/// # Errors
///
/// Same as [`send_get`].
pub async fn send_json<T: Serialize + ?Sized>(
    request: reqwest::RequestBuilder,
    url: &str,
    body: &T,
    cancel: &CancellationToken,
) -> Result<reqwest::Response, SourceError> {
    send(request.json(body), url, cancel).await
}

async fn send(
    request: reqwest::RequestBuilder,
    url: &str,
    cancel: &CancellationToken,
) -> Result<reqwest::Response, SourceError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SourceError::Cancelled),
        sent = request.send() => {
            sent.map_err(|e| SourceError::Http(format!("request to {url} failed: {e}")))
        }
    }
}

/// Read a response body as text, observing cancellation.
///
/// # Errors
///
/// [`SourceError::Cancelled`] if `cancel` fires first, otherwise
/// [`SourceError::Http`] if the body cannot be read.
pub async fn read_text(
    response: reqwest::Response,
    cancel: &CancellationToken,
) -> Result<String, SourceError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SourceError::Cancelled),
        body = response.text() => {
            body.map_err(|e| SourceError::Http(format!("response read failed: {e}")))
        }
    }
}

/// GET `url` and return the body, treating any non-2xx status as a failure.
///
/// # Errors
///
/// See [`send_get`] and [`read_text`]; a non-2xx status is
/// [`SourceError::Http`].
pub async fn fetch_text(
    config: &SourceConfig,
    url: &str,
    cancel: &CancellationToken,
) -> Result<String, SourceError> {
    let client = build_client(config)?;
    let response = send_get(&client, url, cancel)
        .await?
        .error_for_status()
        .map_err(|e| SourceError::Http(e.to_string()))?;
    let body = read_text(response, cancel).await?;
    tracing::trace!(url, bytes = body.len(), "response received");
    Ok(body)
}

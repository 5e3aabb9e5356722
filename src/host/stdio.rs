//! Stdin/stdout JSON bridge for the host command channel.
//!
//! Reads newline-delimited JSON `CommandEnvelope` messages, dispatches them
//! through the `HostCommandServer` router, and writes `ResponseEnvelope` and
//! `EventEnvelope` messages as newline-delimited JSON.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::Mutex;
use tokio::sync::broadcast::error::RecvError;

use crate::config::LookoutConfig;
use crate::error::{LookoutError, Result};
use crate::host::channel::{HostCommandClient, command_channel};
use crate::host::contract::{CommandEnvelope, CommandName, ResponseEnvelope};

/// Default request channel capacity for the stdio bridge.
const REQUEST_CAPACITY: usize = 64;

/// Default event broadcast channel capacity for the stdio bridge.
const EVENT_CAPACITY: usize = 256;

type SharedWriter<W> = Arc<Mutex<BufWriter<W>>>;

/// Run the bridge on the process stdin/stdout.
pub async fn run_stdio_bridge(config: LookoutConfig) -> Result<()> {
    run_bridge(
        config,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

/// Run the JSON bridge until `input` closes or a `runtime.stop` command is
/// received.
///
/// Three tasks run concurrently:
///
/// 1. **Reader** -- reads lines from `input`, dispatches each command and
///    writes the response.
/// 2. **Event forwarder** -- writes broadcast screen events.
/// 3. **Server** -- runs the `HostCommandServer` router loop.
pub async fn run_bridge<R, W>(config: LookoutConfig, input: R, output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (client, server) = command_channel(REQUEST_CAPACITY, EVENT_CAPACITY, config);
    let writer: SharedWriter<W> = Arc::new(Mutex::new(BufWriter::new(output)));

    let server_handle = tokio::spawn(server.run());

    let event_writer = Arc::clone(&writer);
    let mut event_rx = client.subscribe_events();
    let event_handle = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event_envelope) => match serde_json::to_string(&event_envelope) {
                    Ok(json) => {
                        let mut w = event_writer.lock().await;
                        if let Err(e) = write_line(&mut w, &json).await {
                            tracing::warn!(
                                error = %e,
                                "failed to write event envelope; stopping event forwarder"
                            );
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to serialize event envelope; skipping");
                    }
                },
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "event forwarder lagged; some events were dropped");
                }
                Err(RecvError::Closed) => {
                    tracing::debug!("event channel closed; stopping event forwarder");
                    break;
                }
            }
        }
    });

    let reader_result = run_reader(client, input, Arc::clone(&writer)).await;

    // The reader dropped the client, so the server drains and exits, which
    // closes the event channel.
    let _ = server_handle.await;
    let _ = event_handle.await;

    reader_result
}

/// Read lines, dispatch each command, and write responses.
async fn run_reader<R, W>(
    client: HostCommandClient,
    mut input: R,
    writer: SharedWriter<W>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = input
            .read_line(&mut line)
            .await
            .map_err(|e| LookoutError::Channel(format!("failed to read command: {e}")))?;

        if bytes_read == 0 {
            tracing::info!("input closed (EOF); shutting down bridge");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let envelope: CommandEnvelope = match serde_json::from_str(trimmed) {
            Ok(env) => env,
            Err(e) => {
                tracing::warn!(error = %e, raw_line = %trimmed, "failed to parse command envelope");
                let error_response = ResponseEnvelope::error(
                    "parse-error",
                    format!("failed to parse command envelope: {e}"),
                );
                write_response(&writer, &error_response).await?;
                continue;
            }
        };

        let request_id = envelope.request_id.clone();
        let is_stop = envelope.command == CommandName::RuntimeStop;

        let response = match client.send(envelope).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(error = %e, "host command dispatch failed");
                ResponseEnvelope::error(request_id, e.to_string())
            }
        };
        write_response(&writer, &response).await?;

        if is_stop && response.ok {
            tracing::info!("runtime.stop received; shutting down bridge");
            break;
        }
    }

    Ok(())
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &SharedWriter<W>,
    response: &ResponseEnvelope,
) -> Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| LookoutError::Protocol(format!("failed to serialize response: {e}")))?;
    let mut w = writer.lock().await;
    write_line(&mut w, &json).await
}

/// Write a single JSON line to the buffered writer and flush.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut BufWriter<W>, json: &str) -> Result<()> {
    writer
        .write_all(json.as_bytes())
        .await
        .map_err(|e| LookoutError::Channel(format!("failed to write output: {e}")))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| LookoutError::Channel(format!("failed to write newline: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| LookoutError::Channel(format!("failed to flush output: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::host::contract::EVENT_VERSION;

    async fn run_lines(lines: &str) -> Vec<serde_json::Value> {
        let (output, mut reader) = tokio::io::duplex(64 * 1024);
        run_bridge(LookoutConfig::default(), lines.as_bytes(), output)
            .await
            .unwrap();

        let mut raw = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut reader, &mut raw)
            .await
            .unwrap();
        raw.lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn ping_then_stop() {
        let lines = concat!(
            r#"{"v":1,"request_id":"a","command":"host.ping","payload":{}}"#,
            "\n",
            r#"{"v":1,"request_id":"b","command":"runtime.stop","payload":{}}"#,
            "\n",
            r#"{"v":1,"request_id":"c","command":"host.ping","payload":{}}"#,
            "\n",
        );
        let out = run_lines(lines).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["request_id"], "a");
        assert_eq!(out[0]["payload"]["pong"], true);
        assert_eq!(out[1]["request_id"], "b");
        assert_eq!(out[1]["v"], EVENT_VERSION);
    }

    #[tokio::test]
    async fn malformed_line_gets_parse_error_response() {
        let out = run_lines("not json\n\n").await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["request_id"], "parse-error");
        assert_eq!(out[0]["ok"], false);
    }

    #[tokio::test]
    async fn invalid_version_keeps_request_id() {
        let out = run_lines(r#"{"v":7,"request_id":"x","command":"host.ping"}"#).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["request_id"], "x");
        assert!(
            out[0]["error"]
                .as_str()
                .unwrap()
                .contains("unsupported contract version")
        );
    }
}

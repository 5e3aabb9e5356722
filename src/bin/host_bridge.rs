//! Headless host bridge binary for stdin/stdout JSON communication.
//!
//! Reads `CommandEnvelope` messages as newline-delimited JSON from stdin and
//! writes `ResponseEnvelope` and `EventEnvelope` messages to stdout.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel.

use lookout::LookoutConfig;
use lookout::host::stdio::run_stdio_bridge;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise tracing to stderr only (stdout is reserved for the JSON
    // protocol).
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = LookoutConfig::default_config_path();
    let config = if path.exists() {
        tracing::info!(path = %path.display(), "loading config");
        LookoutConfig::from_file(&path)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?
    } else {
        LookoutConfig::default()
    };

    tracing::info!("lookout-host starting");

    run_stdio_bridge(config).await.map_err(|e| {
        tracing::error!(error = %e, "lookout-host exited with error");
        anyhow::anyhow!("lookout-host failed: {e}")
    })?;

    tracing::info!("lookout-host shut down cleanly");
    Ok(())
}

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const DEFAULT_LOG_LEVEL: &str =
    "info,conference_roster_backend=debug,conference_roster_database=debug,diesel=info";

/// Logs to stdout. The filter is taken from `RUST_LOG`, then from
/// `configured`, then [`DEFAULT_LOG_LEVEL`].
pub fn setup_telemetry(configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| configured.map_or_else(|| Ok(DEFAULT_LOG_LEVEL.into()), EnvFilter::try_new))
        .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into());

    // will also redirect log events to trace events
    let stdout_log = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(stdout_log.with_filter(filter))
        .init();
}

//! Tracing subscriber setup for hosts embedding the client.

use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Transport internals are only interesting when something is wrong.
const QUIET_TARGETS: &[&str] = &["hyper_util=warn", "reqwest=warn", "rustls=warn"];

fn build_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directives = std::iter::once(level.to_string())
        .chain(QUIET_TARGETS.iter().map(|d| d.to_string()))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. `RUST_LOG` wins over `config.level`.
///
/// Fails if the host already installed one.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let subscriber = tracing_subscriber::registry().with(build_filter(&config.level));

    match config.format.as_str() {
        "json" => subscriber
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .try_init(),
        "compact" => subscriber
            .with(fmt::layer().compact().with_target(false))
            .try_init(),
        _ => subscriber
            .with(fmt::layer().pretty().with_target(true))
            .try_init(),
    }
}

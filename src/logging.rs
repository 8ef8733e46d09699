//! Tracing setup for the service
//!
//! Transfer events carry `transfer_id`, `from`, `to`, `amount`, `state` and
//! `step` fields; in JSON mode they are flattened to top-level keys so log
//! queries can filter on them directly.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

/// Targets that are too chatty at the service level
const QUIET_TARGETS: &[&str] = &["sqlx=warn", "hyper=warn", "tower=warn"];

fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

fn filter_directives(log_level: &str) -> String {
    std::iter::once(log_level)
        .chain(QUIET_TARGETS.iter().copied())
        .collect::<Vec<_>>()
        .join(",")
}

/// `RUST_LOG` wins; an unparsable `log_level` falls back to `info`
fn build_filter(log_level: &str) -> (EnvFilter, Option<String>) {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return (filter, None);
    }
    match EnvFilter::try_new(filter_directives(log_level)) {
        Ok(filter) => (filter, None),
        Err(e) => (
            EnvFilter::new(filter_directives("info")),
            Some(format!("Invalid log_level '{}': {}", log_level, e)),
        ),
    }
}

/// Install the global subscriber. Keep the returned guard alive for the life
/// of the process or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let file_appender =
        RollingFileAppender::new(rotation(&config.rotation), &config.log_dir, &config.log_file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let (filter, filter_warning) = build_filter(&config.log_level);
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    if let Some(warning) = filter_warning {
        tracing::warn!("{}", warning);
    }

    guard
}

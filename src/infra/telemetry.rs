use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "shortcodes_config_fetch_total",
            Unit::Count,
            "Configuration fetch attempts by fetcher and outcome."
        );
        describe_counter!(
            "shortcodes_config_purge_total",
            Unit::Count,
            "Deletions of both cache keys by reason (total_miss, explicit)."
        );
        describe_histogram!(
            "shortcodes_config_resolve_ms",
            Unit::Milliseconds,
            "Configuration resolution latency in milliseconds."
        );
        describe_counter!(
            "shortcodes_binding_total",
            Unit::Count,
            "Shortcode bindings by selected method (get_html, invoke, fallback)."
        );
        describe_counter!(
            "shortcodes_cache_memory_evict_total",
            Unit::Count,
            "Total number of fast-tier evictions due to capacity."
        );
    });
}

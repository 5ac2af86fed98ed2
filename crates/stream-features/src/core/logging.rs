//! Tracing subscriber setup for the library and the CLI
//!
//! Every stage opens a span (`extract_nodes`, `associate`, `identify`,
//! `pipeline`) and reports node counts as structured fields. Output goes to
//! stderr so the CLI can keep stdout for node data.
//!
//! Environment overrides, used when no explicit value is passed:
//!
//! - `STREAM_FEATURES_LOG_LEVEL`, then `RUST_LOG`: level or filter directive
//! - `STREAM_FEATURES_LOG_FORMAT`: `compact`, `pretty`, or `json`
//!
//! ```bash
//! # Per-center association traces only
//! RUST_LOG="stream_features::core::association=trace" stream-features extract -i lines.geojson
//! ```

use std::str::FromStr;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Environment variable overriding the log level
pub const LOG_LEVEL_ENV: &str = "STREAM_FEATURES_LOG_LEVEL";

/// Environment variable overriding the log format
pub const LOG_FORMAT_ENV: &str = "STREAM_FEATURES_LOG_FORMAT";

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One line per event, no span lifecycle events
    #[default]
    Compact,
    /// Multi-line with source locations and span close timings
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }

    /// Format from an explicit name, then `STREAM_FEATURES_LOG_FORMAT`
    fn resolve(format: Option<&str>) -> Result<Self, String> {
        match format
            .map(str::to_string)
            .or_else(|| std::env::var(LOG_FORMAT_ENV).ok())
        {
            Some(name) => name
                .parse()
                .map_err(|e| format!("Invalid log format: {}", e)),
            None => Ok(LogFormat::default()),
        }
    }

    fn layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let stderr = fmt::layer().with_writer(std::io::stderr);
        match self {
            LogFormat::Compact => stderr
                .with_target(false)
                .with_span_events(FmtSpan::NONE)
                .compact()
                .boxed(),
            LogFormat::Pretty => stderr
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .pretty()
                .boxed(),
            LogFormat::Json => stderr.with_span_events(FmtSpan::CLOSE).json().boxed(),
        }
    }
}

/// Resolve the filter from an explicit level, the environment, or `info`
fn resolve_filter(level: Option<&str>) -> EnvFilter {
    let directive = level
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
///
/// `level` is a level or filter directive and `format` one of
/// [`LogFormat::variants`]; `None` falls back to the environment overrides,
/// then to `info` and `compact`.
///
/// Fails for an unknown format or when a global subscriber is already set.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = LogFormat::resolve(format)?;

    Registry::default()
        .with(format.layer())
        .with(resolve_filter(level))
        .try_init()?;
    Ok(())
}

/// Initialize logging with default settings (info level, compact format)
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}

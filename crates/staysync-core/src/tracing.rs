//! Logging setup shared by the staysync binaries.
//!
//! ```ignore
//! use staysync_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::default())?;
//! ```

use thiserror::Error;
use tracing::{Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    prelude::*,
    registry::LookupSpan,
};

/// Crate targets that receive the default level when `RUST_LOG` is unset.
const CRATE_TARGETS: [&str; 4] = [
    "staysync_core",
    "staysync_feeds",
    "staysync_engine",
    "staysync_cli",
];

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    #[default]
    Pretty,
    Compact,
    /// One JSON object per line, for log shipping.
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level applied to the staysync crates when `RUST_LOG` is not set
    pub default_level: Level,
    pub output_format: TracingOutputFormat,
    /// Include file/line information
    pub include_location: bool,
    /// Include the module path
    pub include_target: bool,
    pub include_timestamp: bool,
    /// Emit span open/close events
    pub include_span_events: bool,
    /// Explicit filter directive; takes precedence over `RUST_LOG`
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::WARN,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            include_target: false,
            include_timestamp: false,
            include_span_events: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Verbose CLI output for `--debug`.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            output_format: TracingOutputFormat::Compact,
            include_location: true,
            include_target: true,
            include_timestamp: true,
            include_span_events: false,
            env_filter: None,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Returns the filter directive used when neither an explicit filter nor
    /// `RUST_LOG` is present.
    pub fn default_directive(&self) -> String {
        let level = self.default_level.as_str().to_ascii_lowercase();
        CRATE_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn build_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref filter) = self.env_filter {
            return Ok(EnvFilter::try_new(filter)?);
        }
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(self.default_directive())?),
        }
    }
}

/// Installs the global subscriber. Call once, at startup.
///
/// # Errors
///
/// Fails if a global subscriber is already installed or the filter directive
/// does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = config.build_filter()?;
    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer(&config));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the formatting layer. Every format writes to stderr; stdout
/// carries command output only.
fn fmt_layer<S>(config: &TracingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let span_events = if config.include_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_target)
        .with_span_events(span_events);

    match (config.output_format, config.include_timestamp) {
        (TracingOutputFormat::Json, true) => layer.json().boxed(),
        (TracingOutputFormat::Json, false) => layer.json().without_time().boxed(),
        (TracingOutputFormat::Pretty, true) => layer.pretty().boxed(),
        (TracingOutputFormat::Pretty, false) => layer.pretty().without_time().boxed(),
        (TracingOutputFormat::Compact, true) => layer.compact().boxed(),
        (TracingOutputFormat::Compact, false) => layer.compact().without_time().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_quiet() {
        let config = TracingConfig::default();
        assert_eq!(config.default_level, Level::WARN);
        assert_eq!(config.output_format, TracingOutputFormat::Compact);
        assert!(config.env_filter.is_none());
    }

    #[test]
    fn default_directive_covers_every_crate() {
        let directive = TracingConfig::default().with_level(Level::DEBUG).default_directive();
        assert_eq!(
            directive,
            "staysync_core=debug,staysync_feeds=debug,staysync_engine=debug,staysync_cli=debug"
        );
    }

    #[test]
    fn explicit_filter_wins() {
        let config = TracingConfig::default()
            .with_format(TracingOutputFormat::Json)
            .with_env_filter("staysync_engine=trace");
        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert!(config.build_filter().is_ok());
    }

    #[test]
    fn invalid_filter_is_reported() {
        let config = TracingConfig::default().with_env_filter("staysync_engine=notalevel");
        assert!(matches!(
            config.build_filter(),
            Err(TracingError::EnvFilter(_))
        ));
    }

    #[test]
    fn every_format_builds_a_layer() {
        for format in [
            TracingOutputFormat::Pretty,
            TracingOutputFormat::Compact,
            TracingOutputFormat::Json,
        ] {
            for config in [
                TracingConfig::default().with_format(format),
                TracingConfig::cli_debug().with_format(format),
            ] {
                let subscriber = tracing_subscriber::registry().with(fmt_layer(&config));
                tracing::subscriber::with_default(subscriber, || {
                    tracing::warn!(format = ?format, "layer smoke test");
                });
            }
        }
    }
}

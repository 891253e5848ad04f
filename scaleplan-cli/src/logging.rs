//! Diagnostics for `scaleplan` runs.
//!
//! The plan is the only thing written to `stdout`; it is piped into the
//! dispatcher as is. Planning summaries, filter reports and exponent-token
//! warnings go to `stderr` through `tracing`, as human lines by default or
//! as JSON objects when `SCALEPLAN_LOG_FORMAT=json`.

use std::{env, sync::OnceLock};

use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FORMAT_ENV: &str = "SCALEPLAN_LOG_FORMAT";

/// Directive used when `RUST_LOG` is unset or unparsable: planner summaries
/// at `info`, everything else at `warn`.
pub const DEFAULT_DIRECTIVE: &str = "warn,scaleplan_core=info,scaleplan_cli=info";

static INSTALLED: OnceLock<()> = OnceLock::new();

/// How diagnostic events are rendered on `stderr`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    /// One line per event for interactive use.
    #[default]
    Human,
    /// One JSON object per event, including the current span, for batch
    /// wrappers that scrape the planner's diagnostics.
    Json,
}

/// Errors raised while setting up planner diagnostics.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// `SCALEPLAN_LOG_FORMAT` is not valid UTF-8.
    #[error("`{name}` is not valid UTF-8: {source}")]
    InvalidUnicode {
        /// Variable name.
        name: &'static str,
        /// Lookup failure.
        #[source]
        source: env::VarError,
    },
    /// `SCALEPLAN_LOG_FORMAT` names neither `human` nor `json`.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Value as given.
        provided: String,
    },
    /// Another global subscriber is already installed.
    #[error("failed to install tracing subscriber: {source}")]
    InstallFailed {
        /// Error raised by `tracing_subscriber`.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

/// Installs planner diagnostics once per process.
///
/// Later calls are no-ops. When a host process already owns the global
/// subscriber the planner keeps using it and says so on `stderr`.
///
/// # Errors
/// Returns [`LoggingError`] when `SCALEPLAN_LOG_FORMAT` is unreadable or
/// unsupported.
pub fn init_logging() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let format = log_format_from_env()?;
    match install_subscriber(format) {
        Ok(()) => {}
        Err(LoggingError::InstallFailed { source }) => report_foreign_subscriber(&source),
        Err(err) => return Err(err),
    }
    let _ = INSTALLED.set(());
    Ok(())
}

#[expect(
    clippy::print_stderr,
    reason = "tracing is owned by another subscriber, so stderr is the only channel left"
)]
fn report_foreign_subscriber(source: &tracing_subscriber::util::TryInitError) {
    eprintln!("scaleplan diagnostics use an existing subscriber: {source}");
}

fn log_format_from_env() -> Result<LogFormat, LoggingError> {
    match env::var(LOG_FORMAT_ENV) {
        Ok(raw) => parse_log_format(&raw),
        Err(env::VarError::NotPresent) => Ok(LogFormat::default()),
        Err(err @ env::VarError::NotUnicode(_)) => Err(LoggingError::InvalidUnicode {
            name: LOG_FORMAT_ENV,
            source: err,
        }),
    }
}

fn planner_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn install_subscriber(format: LogFormat) -> Result<(), LoggingError> {
    let stderr = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let stderr = match format {
        LogFormat::Json => stderr.json().with_current_span(true).boxed(),
        LogFormat::Human => stderr.with_target(false).boxed(),
    };

    // Dependencies logging through `log` are folded into the same stream.
    let _ = LogTracer::init();

    tracing_subscriber::registry()
        .with(planner_filter())
        .with(stderr)
        .try_init()
        .map_err(|source| LoggingError::InstallFailed { source })
}

fn parse_log_format(raw: &str) -> Result<LogFormat, LoggingError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "human" => Ok(LogFormat::Human),
        "json" => Ok(LogFormat::Json),
        other => Err(LoggingError::UnsupportedFormat {
            provided: other.to_owned(),
        }),
    }
}

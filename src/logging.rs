//! Tracing setup for the greeter.
//!
//! Logs go to stderr by default so that stdout only carries the greeting
//! lines. The subscriber is layered as follows:
//!
//! 1. **EnvFilter**: `RUST_LOG` if set, otherwise `logging.level` from the config
//! 2. **Console layer**: [`ConditionalLocationFormatter`] on stdout or stderr
//! 3. **File layer**: same format without ANSI colours, only when
//!    `logging.file.enabled` is set
//! 4. **Verbosity layer**: [`VerbosityCheckLayer`] counts events per level so
//!    that a noisy run can be reported at shutdown
//!
//! ```rust,no_run
//! use greeter_demo::{init_logging, Config};
//!
//! let config = Config::load()?;
//! let logging = init_logging(&config.logging)?;
//! // ... run ...
//! if let Some(report) = logging.verbosity.check_and_report() {
//!     eprintln!("{}", report);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::config::{LogOutput, LoggingConfig, VerbosityConfig};
use crate::rotating_file_logger::RotatingFileWriter;
use anyhow::{Context as _, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Formatter that omits the INFO prefix and adds target and file:line only
/// for ERROR and WARN
pub struct ConditionalLocationFormatter;

impl<S, N> FormatEvent<S, N> for ConditionalLocationFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let level = metadata.level();

        if *level != Level::INFO {
            write!(writer, "{}", level)?;
            if matches!(*level, Level::ERROR | Level::WARN) {
                write!(writer, " {}", metadata.target())?;
                if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
                    write!(writer, " {}:{}", file, line)?;
                }
            }
            write!(writer, ": ")?;
        }

        if let Some(scope) = ctx.event_scope() {
            let mut first = true;
            for span in scope.from_root() {
                if !first {
                    write!(writer, ":")?;
                }
                first = false;
                write!(writer, "{}", span.name())?;

                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{}}}", fields)?;
                    }
                }
            }
            if !first {
                write!(writer, " ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// A tracing Layer that counts log events by level to detect excessive verbosity
#[derive(Debug, Clone)]
pub struct VerbosityCheckLayer {
    counts: Arc<[AtomicUsize; 5]>,
    configured_level: Level,
    thresholds: VerbosityConfig,
}

/// Breakdown of log counts by level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogCounts {
    pub error: usize,
    pub warn: usize,
    pub info: usize,
    pub debug: usize,
    pub trace: usize,
}

impl LogCounts {
    pub fn total(&self) -> usize {
        self.error + self.warn + self.info + self.debug + self.trace
    }
}

/// Returned when a run logged more events than its level allows
#[derive(Debug, Clone)]
pub struct VerbosityWarning {
    pub threshold: usize,
    pub configured_level: Level,
    pub counts: LogCounts,
}

impl VerbosityCheckLayer {
    pub fn new(thresholds: VerbosityConfig, configured_level: Level) -> Self {
        Self {
            counts: Arc::new(Default::default()),
            configured_level,
            thresholds,
        }
    }

    fn slot(level: &Level) -> usize {
        match *level {
            Level::ERROR => 0,
            Level::WARN => 1,
            Level::INFO => 2,
            Level::DEBUG => 3,
            Level::TRACE => 4,
        }
    }

    pub fn counts_by_level(&self) -> LogCounts {
        let get = |level: Level| self.counts[Self::slot(&level)].load(Ordering::Relaxed);
        LogCounts {
            error: get(Level::ERROR),
            warn: get(Level::WARN),
            info: get(Level::INFO),
            debug: get(Level::DEBUG),
            trace: get(Level::TRACE),
        }
    }

    pub fn total_count(&self) -> usize {
        self.counts_by_level().total()
    }

    /// WARN and ERROR runs are never considered too verbose
    pub fn check_verbosity(&self) -> Option<VerbosityWarning> {
        let threshold = match self.configured_level {
            Level::TRACE => self.thresholds.trace_threshold,
            Level::DEBUG => self.thresholds.debug_threshold,
            Level::INFO => self.thresholds.info_threshold,
            Level::WARN | Level::ERROR => return None,
        };

        let counts = self.counts_by_level();
        (counts.total() > threshold).then(|| VerbosityWarning {
            threshold,
            configured_level: self.configured_level,
            counts,
        })
    }

    pub fn check_and_report(&self) -> Option<String> {
        self.check_verbosity().map(|warning| {
            format!(
                "\nLOG VERBOSITY WARNING\n\
                ========================\n\
                Total log events: {} (threshold: {} for {} level)\n\n\
                Breakdown by level:\n\
                  ERROR: {}\n\
                  WARN:  {}\n\
                  INFO:  {}\n\
                  DEBUG: {}\n\
                  TRACE: {}",
                warning.counts.total(),
                warning.threshold,
                warning.configured_level,
                warning.counts.error,
                warning.counts.warn,
                warning.counts.info,
                warning.counts.debug,
                warning.counts.trace,
            )
        })
    }
}

impl<S: Subscriber> Layer<S> for VerbosityCheckLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let slot = Self::slot(event.metadata().level());
        self.counts[slot].fetch_add(1, Ordering::Relaxed);
    }
}

/// Guess the effective level from RUST_LOG, falling back to `default_level`
pub fn detect_configured_level(rust_log: Option<&str>, default_level: &str) -> Level {
    let directive = rust_log.unwrap_or(default_level).to_lowercase();
    for (name, level) in [
        ("trace", Level::TRACE),
        ("debug", Level::DEBUG),
        ("info", Level::INFO),
        ("warn", Level::WARN),
        ("error", Level::ERROR),
    ] {
        if directive.contains(name) {
            return level;
        }
    }
    Level::INFO
}

/// Filter from RUST_LOG when it parses, otherwise from `default_level`,
/// along with the level the verbosity check should assume
pub fn build_env_filter(rust_log: Option<&str>, default_level: &str) -> (EnvFilter, Level) {
    if let Some(directives) = rust_log {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return (filter, detect_configured_level(Some(directives), default_level));
        }
    }
    (EnvFilter::new(default_level), detect_configured_level(None, default_level))
}

/// Handles kept alive by `main` for the duration of the run
pub struct LoggingHandles {
    pub verbosity: VerbosityCheckLayer,
    pub log_file: Option<PathBuf>,
}

/// Install the global subscriber described by `config`
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingHandles> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let (env_filter, active_level) = build_env_filter(rust_log.as_deref(), &config.level);
    let verbosity = VerbosityCheckLayer::new(config.verbosity.clone(), active_level);

    let console_writer = match config.output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
    };
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(console_writer)
        .event_format(ConditionalLocationFormatter);

    let file_writer = if config.file.enabled {
        Some(
            RotatingFileWriter::new(config.file.clone())
                .with_context(|| format!("Failed to open log file in {}", config.file.log_directory))?,
        )
    } else {
        None
    };
    let log_file = file_writer.as_ref().map(|w| w.path().to_path_buf());
    let file_layer = file_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .event_format(ConditionalLocationFormatter)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .with(verbosity.clone())
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingHandles { verbosity, log_file })
}

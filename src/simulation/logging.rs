//! Logging setup
//!
//! Console output goes to stderr so the summary printed on stdout stays
//! parseable. Archived runs additionally write JSON lines to a daily log file
//! next to the exported results.

use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// File name prefix of archived logs
pub const LOG_FILE_PREFIX: &str = "dispensary-simulator";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// How the global subscriber is set up
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Most verbose level emitted by this crate
    pub level: LevelFilter,
    /// Log span open and close on the console
    pub span_events: bool,
    /// Directory for the JSON log file, if any
    pub archive_directory: Option<PathBuf>,
}

impl LoggingConfig {
    /// Console logging at `level`
    pub fn new(level: LevelFilter) -> Self {
        Self { level, span_events: false, archive_directory: None }
    }

    /// Also log span open and close
    pub fn with_span_events(mut self) -> Self {
        self.span_events = true;
        self
    }

    /// Also write JSON lines to a daily file in `directory`
    pub fn archived_in(mut self, directory: impl Into<PathBuf>) -> Self {
        self.archive_directory = Some(directory.into());
        self
    }

    /// Filter directive used when `RUST_LOG` is not set
    pub fn default_directive(&self) -> String {
        format!("{}={}", env!("CARGO_PKG_NAME").replace('-', "_"), self.level)
    }

    /// Install the global subscriber
    ///
    /// The returned guard flushes the log file when dropped; keep it alive for
    /// the whole run.
    pub fn init(self) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.default_directive()))?;
        let span_events = if self.span_events { FmtSpan::NEW | FmtSpan::CLOSE } else { FmtSpan::NONE };

        let mut layers: Vec<BoxedLayer> =
            vec![fmt::layer().with_writer(io::stderr).with_span_events(span_events).boxed()];

        let guard = match &self.archive_directory {
            Some(directory) => {
                let (writer, guard) = non_blocking(rolling::daily(directory, LOG_FILE_PREFIX));
                layers.push(fmt::layer().json().with_ansi(false).with_writer(writer).boxed());
                Some(guard)
            }
            None => None,
        };

        Registry::default().with(layers).with(filter).try_init()?;
        info!(level = %self.level, archive = ?self.archive_directory, "logging initialized");
        Ok(guard)
    }

    /// Warnings only, so a plain run prints just the summary
    pub fn init_quiet() -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
        Self::new(LevelFilter::WARN).init()
    }

    /// Run milestones and span timings
    pub fn init_verbose() -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
        Self::new(LevelFilter::INFO).with_span_events().init()
    }

    /// One line per arrival, stage, pickup and delivery
    pub fn init_debug() -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
        Self::new(LevelFilter::DEBUG).with_span_events().init()
    }

    /// Run milestones on the console and in a JSON file under `directory`
    pub fn init_archived(
        directory: impl Into<PathBuf>,
    ) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error + Send + Sync>> {
        Self::new(LevelFilter::INFO).archived_in(directory).init()
    }
}

/// Structured event stamped with the simulation clock
#[macro_export]
macro_rules! sim_event {
    ($level:ident, $now:expr, $message:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::$level!(
            message = $message,
            component = "simulation",
            sim_time = $now,
            $($key = $value,)*
        );
    };
    ($level:ident, $now:expr, $message:expr) => {
        tracing::$level!(
            message = $message,
            component = "simulation",
            sim_time = $now,
        );
    };
}

/// Span for timing a section of the run
#[macro_export]
macro_rules! perf_span {
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info_span!(
            $name,
            component = "performance",
            $($key = $value,)*
        )
    };
    ($name:expr) => {
        tracing::info_span!(
            $name,
            component = "performance",
        )
    };
}

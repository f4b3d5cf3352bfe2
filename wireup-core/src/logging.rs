//! Logging setup for applications wiring services through a registry.
//!
//! The container emits `tracing` events with structured fields (`registry`,
//! `service`, `member`, ...). This module installs a subscriber for them.
//!
//! ```no_run
//! use wireup_core::logging::*;
//!
//! LogConfig::new()
//!     .level(LogLevel::Debug)
//!     .format(LogFormat::Pretty)
//!     .try_init();
//!
//! info!("Registry wired");
//! ```

use std::io;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing::{debug, error, info, trace, warn};

/// Environment variable carrying a full filter directive, e.g. `wireup_core=trace`.
pub const ENV_LOG_FILTER: &str = "WIREUP_LOG";

/// Threshold applied when no filter directive is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Silence container events entirely
    Off,
    Error,
    Warn,
    Info,
    Debug,
    /// Includes per-member mock handle creation
    Trace,
}

impl LogLevel {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Rendering of container events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event, fields included
    Json,
    /// Single line without colors
    Plain,
    Pretty,
    Compact,
}

/// Stream that receives events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    pub thread_ids: bool,
    pub targets: bool,
    pub colors: bool,
    /// Overrides `level` when set
    pub env_filter: Option<String>,
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_thread_ids(mut self, enable: bool) -> Self {
        self.thread_ids = enable;
        self
    }

    pub fn with_targets(mut self, enable: bool) -> Self {
        self.targets = enable;
        self
    }

    pub fn with_colors(mut self, enable: bool) -> Self {
        self.colors = enable;
        self
    }

    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Resolve the filter: explicit override, then `WIREUP_LOG`, then `level`.
    pub fn filter(&self) -> EnvFilter {
        if let Some(directive) = &self.env_filter {
            if let Ok(filter) = EnvFilter::try_new(directive) {
                return filter;
            }
        }

        EnvFilter::try_from_env(ENV_LOG_FILTER).unwrap_or_else(|_| {
            EnvFilter::builder()
                .with_default_directive(self.level.level_filter().into())
                .parse_lossy("")
        })
    }

    /// Install the global subscriber. Returns false when one is already set.
    pub fn try_init(self) -> bool {
        match self.output {
            LogOutput::Stdout => self.install(io::stdout),
            LogOutput::Stderr => self.install(io::stderr),
        }
    }

    fn install<W>(&self, writer: W) -> bool
    where
        W: for<'a> fmt::MakeWriter<'a> + Send + Sync + 'static,
    {
        let registry = tracing_subscriber::registry().with(self.filter());

        let installed = match self.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_target(self.targets)
                        .with_thread_ids(self.thread_ids),
                )
                .try_init(),
            LogFormat::Plain => registry
                .with(
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(self.targets)
                        .with_thread_ids(self.thread_ids),
                )
                .try_init(),
            LogFormat::Pretty => registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(writer)
                        .with_ansi(self.colors)
                        .with_target(self.targets)
                        .with_thread_ids(self.thread_ids),
                )
                .try_init(),
            LogFormat::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(writer)
                        .with_ansi(self.colors)
                        .with_target(self.targets)
                        .with_thread_ids(self.thread_ids),
                )
                .try_init(),
        };

        installed.is_ok()
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            output: LogOutput::Stderr,
            thread_ids: false,
            targets: true,
            colors: false,
            env_filter: None,
        }
    }
}

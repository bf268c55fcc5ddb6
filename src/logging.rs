use serde::{Deserialize, Serialize};
use std::fs::create_dir_all;
use std::io;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

#[derive(clap::ValueEnum, Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoggingOptions {
    pub console_level: LogLevel,
    pub file_level: LogLevel,
    pub file_enabled: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            console_level: LogLevel::Warn,
            file_level: LogLevel::Debug,
            file_enabled: false,
        }
    }
}

/// Console output goes to stderr so stdout stays clean for results. The
/// returned guard must be held until exit or buffered file logs are lost.
pub fn setup_logging(opts: &LoggingOptions, log_dir: &Path) -> Option<WorkerGuard> {
    let console_level = LevelFilter::from_level(opts.console_level.into());
    let console = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(console_level);

    let (file, guard) = if opts.file_enabled && create_dir_all(log_dir).is_ok() {
        let appender = tracing_appender::rolling::daily(log_dir, "pin-buddy.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(LevelFilter::from_level(opts.file_level.into()));
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();
    guard
}

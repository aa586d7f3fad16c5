//! Rolling Logger
//!
//! Installs a `tracing` subscriber that writes to a size-rotated file set
//! and keeps the most recent lines in memory. `log` records are bridged
//! through the same subscriber.

mod writer;

use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

pub use writer::{RollingFileWriter, RollingHandle, RollingOptions};

static LOGGER: OnceLock<RollingFileWriter> = OnceLock::new();

/// Local wall-clock timestamps
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Parse a level name ("info", "debug", ...), falling back to info
pub fn parse_level(level: &str) -> log::LevelFilter {
    level.trim().parse().unwrap_or(log::LevelFilter::Info)
}

fn to_tracing_level(level: log::LevelFilter) -> LevelFilter {
    match level {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    }
}

/// Initialize logging into `log_dir/<app_name>.log` at info level
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    init_logger_with(log_dir, app_name, log::LevelFilter::Info, RollingOptions::default())
}

/// Initialize logging with an explicit level and rotation limits
///
/// Calling this again after a successful init is a no-op.
pub fn init_logger_with(
    log_dir: PathBuf,
    app_name: &str,
    level: log::LevelFilter,
    options: RollingOptions,
) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Ok(());
    }

    let writer = RollingFileWriter::new(&log_dir, &format!("{}.log", app_name), options)
        .map_err(|e| format!("Failed to open log file in {}: {}", log_dir.display(), e))?;

    tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_max_level(to_tracing_level(level))
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))?;

    let _ = LOGGER.set(writer);
    Ok(())
}

fn ensure_initialized() -> Result<(), String> {
    if LOGGER.get().is_some() {
        Ok(())
    } else {
        Err("Logger not initialized".to_string())
    }
}

pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Most recent log lines, oldest first (empty before init)
pub fn recent_lines(count: usize) -> Vec<String> {
    LOGGER
        .get()
        .map(|writer| writer.recent_lines(count))
        .unwrap_or_default()
}

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::AppResult;

const LOG_RETENTION_DAYS: u64 = 7;

struct LocalTimer;

impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.to_rfc3339())
    }
}

pub fn get_log_dir() -> AppResult<PathBuf> {
    let log_dir = crate::modules::system::config::get_data_dir()?.join("logs");
    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)?;
    }
    Ok(log_dir)
}

/// Console + daily rolling file. The returned guard flushes the file writer
/// and must live as long as the process logs.
pub fn init_logger() -> Option<WorkerGuard> {
    let _ = tracing_log::LogTracer::init();

    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::Layer::new()
        .with_target(false)
        .with_level(true)
        .with_timer(LocalTimer);

    let log_dir = match get_log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Failed to initialize log directory: {}", e);
            let _ = tracing_subscriber::registry()
                .with(filter_layer)
                .with(console_layer)
                .try_init();
            return None;
        }
    };

    let file_appender = tracing_appender::rolling::daily(&log_dir, "playground.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(LocalTimer);

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    info!("Log system initialized (Console + File persistence)");
    match cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS) {
        Ok(0) => {}
        Ok(deleted) => info!("Log cleanup completed: deleted {} expired files", deleted),
        Err(e) => warn!("Failed to cleanup old logs: {}", e),
    }

    Some(guard)
}

pub fn cleanup_old_logs(log_dir: &Path, days_to_keep: u64) -> AppResult<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }
    let cutoff = SystemTime::now()
        .checked_sub(Duration::from_secs(days_to_keep * 24 * 60 * 60))
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut deleted = 0;
    for entry in fs::read_dir(log_dir)?.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => continue,
        };
        if modified >= cutoff {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => deleted += 1,
            Err(e) => warn!("Failed to delete old log file {:?}: {}", path, e),
        }
    }
    Ok(deleted)
}

pub fn log_info(message: &str) {
    match crate::modules::system::request_context::try_get() {
        Some(ctx) => info!(request_id = %ctx.request_id, correlation_id = ?ctx.correlation_id, "{}", message),
        None => info!("{}", message),
    }
}

pub fn log_warn(message: &str) {
    match crate::modules::system::request_context::try_get() {
        Some(ctx) => warn!(request_id = %ctx.request_id, correlation_id = ?ctx.correlation_id, "{}", message),
        None => warn!("{}", message),
    }
}

pub fn log_error(message: &str) {
    match crate::modules::system::request_context::try_get() {
        Some(ctx) => error!(request_id = %ctx.request_id, correlation_id = ?ctx.correlation_id, "{}", message),
        None => error!("{}", message),
    }
}

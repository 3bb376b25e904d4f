use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::http_cache::app_cache_dir;

const DEFAULT_FILTER: &str = "info,bolastats=debug";
const LOG_FILE: &str = "bolastats.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Stderr logging for the plain CLI.
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// File logging for the terminal dashboard, which owns stdout.
/// The returned guard must stay alive for buffered lines to be flushed.
pub fn init_file_logging() -> Option<WorkerGuard> {
    let dir = app_cache_dir()?;
    if std::fs::create_dir_all(&dir).is_err() {
        return None;
    }
    // `rolling::never` panics if the file cannot be created, so probe first.
    if std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
        .is_err()
    {
        return None;
    }
    let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

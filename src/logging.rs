//! Diagnostics and the activity log.
//!
//! Everything is emitted through `tracing`. Two layers are installed:
//! a console layer on stderr (warnings by default, `RUST_LOG` or `--verbose`
//! to see more) and, unless disabled, an append-only activity log that keeps
//! every `info` event: moves, folder creation, dry-run decisions, errors and
//! summaries.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;

/// Default activity log file name.
pub const DEFAULT_LOG_FILE: &str = "organizer.log";

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Local wall-clock timestamps for the activity log.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format(TIMESTAMP_FORMAT))
    }
}

fn open_log_file(path: &Path) -> Result<RollingFileAppender, String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| format!("invalid log file name: {}", path.display()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .map_err(|e| e.to_string())
}

/// Installs the global subscriber.
///
/// The returned guard flushes the activity log when dropped; keep it alive
/// for the whole run. A log file that cannot be opened only produces a
/// warning.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let default_level = if verbose { "debug" } else { "warn" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let mut guard = None;
    let file_layer = match log_file.map(|path| (path, open_log_file(path))) {
        Some((_, Ok(appender))) => {
            let (writer, worker_guard) = tracing_appender::non_blocking(appender);
            guard = Some(worker_guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(false)
                    .with_timer(LocalTimer)
                    .with_filter(LevelFilter::INFO),
            )
        }
        Some((path, Err(e))) => {
            eprintln!(
                "Warning: could not open log file {}: {}",
                path.display(),
                e
            );
            None
        }
        None => None,
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Warning: logging already initialized: {}", e);
    }

    guard
}

/// Marks the start of a run in the activity log.
pub fn session_started() {
    tracing::info!("=== New Organizer Session Started ===");
}

/// Marks the end of a run in the activity log.
pub fn session_ended() {
    tracing::info!("=== Session Ended ===");
}

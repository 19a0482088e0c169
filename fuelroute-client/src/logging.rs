use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use tokio::task;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

const LOG_PREFIX: &str = "fuelroute";

/// Keeps the non-blocking file writer alive; drop it only at shutdown.
pub struct LoggerGuard(Option<WorkerGuard>);

/// Known level names pass through; anything else is `None`.
fn normalize_level(level: &str) -> Option<&str> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Some(level),
        _ => None,
    }
}

fn env_filter(level: &str) -> EnvFilter {
    let directive: Directive = level
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into());
    EnvFilter::builder()
        .with_default_directive(directive)
        .parse_lossy(std::env::var("RUST_LOG").unwrap_or_default())
}

/// Subscriber with a stdout layer and, when enabled, a rolling file layer.
///
/// Problems met while building it are returned as messages, to be logged once
/// a subscriber is in place.
fn build_subscriber(
    level: &str,
    settings: &LoggingConfig,
) -> (impl tracing::Subscriber + Send + Sync + 'static, LoggerGuard, Vec<String>) {
    let mut warnings = Vec::new();
    let level = normalize_level(level).unwrap_or_else(|| {
        warnings.push(format!("Invalid log level '{}', defaulting to 'info'", level));
        "info"
    });

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(env_filter(level));

    let mut file_writer = None;
    let mut worker_guard = None;
    if settings.file_enabled {
        match RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_PREFIX)
            .filename_suffix("log")
            .build(&settings.dir)
        {
            Ok(appender) => {
                let (writer, guard) = NonBlocking::new(appender);
                file_writer = Some(writer);
                worker_guard = Some(guard);
            }
            Err(e) => warnings.push(format!(
                "Failed to create log file appender in {:?}: {}. Logging to stdout only.",
                settings.dir, e
            )),
        }
    }

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(env_filter(level))
    });

    let subscriber = tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer);

    (subscriber, LoggerGuard(worker_guard), warnings)
}

/// Install the global subscriber: stdout always, a daily rolling file when enabled.
///
/// Must be called from within a tokio runtime when file logging is on, since
/// pruning of old files runs as a background task.
pub fn init_logging(level: &str, settings: &LoggingConfig) -> LoggerGuard {
    let (subscriber, guard, warnings) = build_subscriber(level, settings);
    subscriber.init();

    for warning in warnings {
        tracing::warn!("{}", warning);
    }

    if guard.0.is_some() {
        let max_age = Duration::from_secs(60 * 60 * 24 * settings.retention_days);
        start_log_cleanup_task(settings.dir.clone(), max_age);
    }

    guard
}

fn start_log_cleanup_task(log_dir: PathBuf, max_age: Duration) {
    const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

    task::spawn(async move {
        loop {
            if let Err(e) = cleanup_old_logs(&log_dir, LOG_PREFIX, max_age) {
                tracing::warn!("Failed to delete old log file: {}", e);
            }
            tokio::time::sleep(CLEANUP_INTERVAL).await;
        }
    });
}

fn cleanup_old_logs(log_dir: &Path, prefix: &str, max_age: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !(file_name.starts_with(prefix) && file_name.ends_with(".log")) {
            continue;
        }

        let modified = fs::metadata(&path)?.modified()?;
        if now.duration_since(modified).unwrap_or_default() > max_age {
            fs::remove_file(&path)?;
            tracing::info!("Old log file deleted: {}", file_name);
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("debug"), Some("debug"));
        assert_eq!(normalize_level("verbose"), None);
    }

    #[test]
    fn test_invalid_level_is_reported_after_build() {
        let (_subscriber, guard, warnings) = build_subscriber("verbose", &LoggingConfig::default());
        assert!(guard.0.is_none());
        assert_eq!(warnings, vec!["Invalid log level 'verbose', defaulting to 'info'"]);
    }

    #[test]
    fn test_file_layer_writes_rolling_log() {
        let dir = std::env::temp_dir().join(format!("fuelroute-file-log-{}", std::process::id()));
        let settings = LoggingConfig {
            dir: dir.clone(),
            file_enabled: true,
            retention_days: 1,
        };

        let (subscriber, guard, warnings) = build_subscriber("info", &settings);
        assert!(warnings.is_empty());
        assert!(guard.0.is_some());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("route request written to file");
        });
        drop(guard);

        let logs: Vec<PathBuf> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(LOG_PREFIX) && n.ends_with(".log"))
            })
            .collect();
        assert_eq!(logs.len(), 1);
        let content = fs::read_to_string(&logs[0]).unwrap();
        assert!(content.contains("route request written to file"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cleanup_keeps_fresh_and_foreign_files() {
        let dir = std::env::temp_dir().join(format!("fuelroute-logs-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("fuelroute.2026-01-01.log"), "x").unwrap();
        fs::write(dir.join("other.log"), "x").unwrap();

        let removed = cleanup_old_logs(&dir, LOG_PREFIX, Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 0);
        assert!(dir.join("fuelroute.2026-01-01.log").exists());
        assert!(dir.join("other.log").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}

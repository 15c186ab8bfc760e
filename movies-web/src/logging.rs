use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Environment;

const DEFAULT_DIRECTIVES: &str = "movies_web=info,movies_core=info,tower_http=info";

/// Initializes console logging, plus JSON file logging in production.
///
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the lifetime of the process.
pub fn init_logging(environment: Environment, log_dir: &Path) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let (file_layer, guard) = if environment.is_development() {
        (None, None)
    } else {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Could not create log directory {}: {e}", log_dir.display());
        }

        // Daily rotation, JSON lines for the log shipper
        let file_appender = tracing_appender::rolling::daily(log_dir, "movies-web.log");
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
        (
            Some(fmt::layer().json().with_writer(non_blocking_writer)),
            Some(guard),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::info;

    // Installs the global subscriber, so this is the only test that may call it.
    #[test]
    fn test_production_logs_to_console_and_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let guard = init_logging(Environment::Production, &log_dir);
        assert!(guard.is_some());
        assert!(log_dir.is_dir());

        info!("movies-web logging initialized");
    }
}

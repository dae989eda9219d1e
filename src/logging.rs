//! Logging configuration for supportrag

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{
    self,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::config::AppConfig;
use crate::Result;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "supportrag.log";

/// Build the filter directive for a level, scoping the crate to the same level
fn filter_directive(level: &str) -> String {
    format!("{level},supportrag={level},tower_http=info")
}

/// Initialize logging with configuration
///
/// `verbose` forces debug output for the crate regardless of the configured level.
pub fn init_logging_with_config(config: Option<&AppConfig>, verbose: bool) -> Result<()> {
    let level = if verbose {
        "debug".to_string()
    } else if let Some(config) = config {
        config.logging.level.clone()
    } else {
        "info".to_string()
    };

    init_logging_with_level(&level)
}

/// Initialize logging with custom log level, writing to stderr and a daily log file
pub fn init_logging_with_level(level: &str) -> Result<()> {
    let logs_dir = Path::new(LOG_DIR);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let env_filter = EnvFilter::try_new(filter_directive(level))
        .unwrap_or_else(|_| EnvFilter::new(filter_directive("info")));

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::SupportRagError::ConfigError(format!("Logging already set: {e}")))?;

    tracing::info!("Logging initialized with level: {level}");
    tracing::info!("Log files will be saved to: {LOG_DIR}/{LOG_FILE}.YYYY-MM-DD");

    // The writer must outlive every span; the process owns it until exit.
    std::mem::forget(guard);

    Ok(())
}

/// Initialize simple console-only logging for tests and one-shot commands
pub fn init_simple_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(EnvFilter::new(filter_directive("info")))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| crate::SupportRagError::ConfigError(format!("Logging already set: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_scopes_crate() {
        let directive = filter_directive("warn");
        assert!(directive.starts_with("warn,"));
        assert!(directive.contains("supportrag=warn"));
        assert!(EnvFilter::try_new(directive).is_ok());
    }

    #[test]
    fn test_simple_logging_does_not_panic() {
        // A second initialization in the same process reports an error instead of panicking
        let _ = init_simple_logging();
        let _ = init_simple_logging();
    }
}

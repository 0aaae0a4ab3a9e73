//! Integration tests for the logging system

use bridge_traits::time::{ConsoleLogger, LogLevel};
use core_runtime::logging::{
    init_logging, redact_if_sensitive, strip_path, LogFormat, LoggingConfig,
};
use std::sync::Arc;

#[test]
fn test_init_logging_only_once() {
    // Global subscriber: only one test in this binary may install it.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_logger_sink(Arc::new(ConsoleLogger::default()));

    assert!(init_logging(config.clone()).is_ok());
    tracing::info!(target: "core_playback", "logging ready");

    assert!(init_logging(config).is_err());
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_pii_redaction(false)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert!(!config.redact_pii);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}

#[test]
fn test_format_selection() {
    let expected = if cfg!(debug_assertions) {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    };
    assert_eq!(LoggingConfig::default().format, expected);
}

#[test]
fn test_redaction_of_credentials() {
    assert_eq!(redact_if_sensitive("refresh_token", "r-1"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("password", "hunter2"), "[REDACTED]");

    let email = redact_if_sensitive("email", "listener@example.com");
    assert!(email.starts_with('l'));
    assert!(!email.contains("example.com"));

    assert_eq!(redact_if_sensitive("mood", "Chill"), "Chill");
}

#[test]
fn test_path_stripping() {
    assert_eq!(strip_path("/var/lib/moodify/favorites.db"), "favorites.db");
    assert_eq!(strip_path("D:\\data\\favorites.db"), "favorites.db");
    assert_eq!(strip_path(""), "");
}

//! Unit tests for the Driver singleton
//!
//! DRIVER_STATE and LOGGER are global, so every test is #[serial].

use crate::mvgl::{Driver, Error, ContextConfig, ErrorCode};
use crate::mvgl::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<String>>>,
}

impl TestLogger {
    fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        let mut entries = self.entries.lock().unwrap();
        entries.push(format!("{:?}: {}", entry.severity, entry.message));
    }
}

fn setup() {
    Driver::reset_for_testing();
    Driver::reset_logger();
    let _ = Driver::initialize();
}

// ============================================================================
// INITIALIZATION AND SHUTDOWN TESTS
// ============================================================================

#[test]
#[serial]
fn test_initialize_is_idempotent() {
    setup();
    assert!(Driver::initialize().is_ok());
    assert!(Driver::initialize().is_ok());
}

#[test]
#[serial]
fn test_shutdown_clears_contexts() {
    setup();
    let _a = Driver::create_context("test_shutdown_a", ContextConfig::default()).unwrap();
    let _b = Driver::create_context("test_shutdown_b", ContextConfig::default()).unwrap();
    assert_eq!(Driver::context_count(), 2);

    Driver::shutdown();
    assert_eq!(Driver::context_count(), 0);
    assert!(Driver::context_names().is_empty());
}

#[test]
#[serial]
fn test_shutdown_keeps_handles_alive() {
    setup();
    let context = Driver::create_context("test_handle", ContextConfig::default()).unwrap();
    Driver::shutdown();

    let mut guard = context.lock().unwrap();
    assert_eq!(guard.get_error(), ErrorCode::NoError);
}

// ============================================================================
// CONTEXT REGISTRY TESTS
// ============================================================================

#[test]
#[serial]
fn test_context_retrieval_returns_same_instance() {
    setup();
    let created = Driver::create_context("test_retrieval", ContextConfig::default()).unwrap();
    let retrieved = Driver::context("test_retrieval").unwrap();
    assert!(Arc::ptr_eq(&created, &retrieved));
}

#[test]
#[serial]
fn test_duplicate_context_name_fails() {
    setup();
    let _first = Driver::create_context("test_duplicate", ContextConfig::default()).unwrap();
    match Driver::create_context("test_duplicate", ContextConfig::default()) {
        Err(Error::InitializationFailed(msg)) => assert!(msg.contains("already exists")),
        _ => panic!("Expected InitializationFailed error"),
    }
}

#[test]
#[serial]
fn test_unknown_context_fails() {
    setup();
    match Driver::context("nonexistent_context_12345") {
        Err(Error::InitializationFailed(msg)) => assert!(msg.contains("not found")),
        _ => panic!("Expected InitializationFailed error"),
    }
}

#[test]
#[serial]
fn test_invalid_config_is_not_registered() {
    setup();
    let config = ContextConfig { window_height: 0, ..ContextConfig::default() };
    assert!(Driver::create_context("test_invalid_config", config).is_err());
    assert_eq!(Driver::context_count(), 0);
}

#[test]
#[serial]
fn test_destroy_context() {
    setup();
    let _context = Driver::create_context("test_destroy", ContextConfig::default()).unwrap();
    Driver::destroy_context("test_destroy").unwrap();
    assert!(Driver::context("test_destroy").is_err());

    // Unknown names are ignored
    assert!(Driver::destroy_context("test_destroy").is_ok());
}

#[test]
#[serial]
fn test_context_names_sorted() {
    setup();
    let _b = Driver::create_context("test_names_b", ContextConfig::default()).unwrap();
    let _a = Driver::create_context("test_names_a", ContextConfig::default()).unwrap();
    assert_eq!(Driver::context_names(), vec!["test_names_a".to_string(), "test_names_b".to_string()]);
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_registry_errors_logged() {
    setup();
    let logger = TestLogger::new();
    let entries = logger.entries.clone();
    Driver::set_logger(logger);

    let _ = Driver::create_context("test_err_log", ContextConfig::default());
    let _ = Driver::create_context("test_err_log", ContextConfig::default());

    let entries = entries.lock().unwrap();
    assert!(entries.iter().any(|e| e.starts_with("Error") && e.contains("already exists")));
    drop(entries);
    Driver::reset_logger();
}

#[test]
#[serial]
fn test_context_errors_logged_as_warnings() {
    setup();
    let logger = TestLogger::new();
    let entries = logger.entries.clone();
    Driver::set_logger(logger);

    let context = Driver::create_context("test_warn_log", ContextConfig::default()).unwrap();
    let _ = context.lock().unwrap().viewport(0, 0, -1, -1);

    let entries = entries.lock().unwrap();
    assert!(entries.iter().any(|e| e.starts_with("Warn") && e.contains("Negative viewport size")));
    drop(entries);
    Driver::reset_logger();
}

#[test]
#[serial]
fn test_log_reaches_custom_logger() {
    setup();
    let logger = TestLogger::new();
    let entries = logger.entries.clone();
    Driver::set_logger(logger);

    Driver::log(LogSeverity::Trace, "mvgl::Test", "trace message".to_string());
    Driver::log_detailed(LogSeverity::Error, "mvgl::Test", "detailed".to_string(), file!(), line!());

    // Unit tests elsewhere may log concurrently; only look at our entries
    let entries = entries.lock().unwrap();
    assert!(entries.contains(&"Trace: trace message".to_string()));
    assert!(entries.contains(&"Error: detailed".to_string()));
    drop(entries);
    Driver::reset_logger();
}

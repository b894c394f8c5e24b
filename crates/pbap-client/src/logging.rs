//! Tracing subscriber configuration for PBAP clients.
//!
//! Log levels follow these conventions:
//! - ERROR: Internal inconsistencies (an action paired with the wrong event)
//! - WARN: Discarded stray events, collaborator failures, timeouts
//! - INFO: Session lifecycle (open, connected, closed, operation complete)
//! - DEBUG: Action routines, request validation, abort handling
//! - TRACE: State machine dispatch, packet sizes, file call-outs

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSection;

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize the tracing subscriber with sensible defaults.
///
/// Log level can be controlled via the `RUST_LOG` environment variable.
/// Defaults to `info` if not set.
pub fn init() {
    tracing_subscriber::fmt().with_env_filter(filter_or("info")).init();
}

/// Initialize the tracing subscriber with JSON output.
pub fn init_json() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter_or("info"))
        .init();
}

/// Initialize from the `[logging]` config section. `RUST_LOG` still wins.
pub fn init_from_config(logging: &LoggingSection) {
    let filter = filter_or(&logging.level);
    if logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Initialize the tracing subscriber for tests.
///
/// Uses `try_init` to avoid panicking if called multiple times.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_or("debug"))
        .with_test_writer()
        .try_init();
}

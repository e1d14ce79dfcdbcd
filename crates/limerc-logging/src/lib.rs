//! # limerc-logging
//!
//! Structured logging with `tracing`.
//!
//! - [`init_subscriber`] installs a compact, human-readable stderr subscriber
//! - [`init_json_subscriber`] installs a JSON-lines stderr subscriber
//! - [`init_from_settings`] picks one of the two from [`LoggingSettings`]
//! - [`capture_logs`] records events in memory for test assertions
//!
//! `RUST_LOG` always takes precedence over the configured level.

#![deny(unsafe_code)]

pub mod capture;

pub use capture::{CapturedEvent, CapturedLogs, capture_logs};

use limerc_settings::LoggingSettings;
use tracing_subscriber::EnvFilter;

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global tracing subscriber with compact stderr output.
///
/// Call once at startup. Subsequent calls are no-ops.
pub fn init_subscriber(level: &str) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}

/// Initialize the global tracing subscriber with JSON-lines stderr output.
pub fn init_json_subscriber(level: &str) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .flatten_event(true);

    let _ = subscriber.try_init();
}

/// Initialize from settings, with an optional level override (e.g. a CLI flag).
pub fn init_from_settings(settings: &LoggingSettings, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&settings.level);
    if settings.json {
        init_json_subscriber(level);
    } else {
        init_subscriber(level);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! # limerc-settings
//!
//! Configuration for the limerc RemoteControl client.
//!
//! Three layers, later ones winning:
//! 1. **Compiled defaults**: [`LimercSettings::default()`]
//! 2. **User file**: `~/.limerc/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `LIMERC_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, data_dir, deep_merge, load_settings, load_settings_from_path,
    settings_path,
};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` for the JSON file
//! format. Each type implements [`Default`] with production default values,
//! and `#[serde(default)]` lets a partial file fill in only what it changes.

mod endpoint;
mod runtime;

pub use endpoint::*;
pub use runtime::*;

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// Loaded from `~/.limerc/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values. Example:
///
/// ```json
/// {
///   "endpoint": { "baseUrl": "https://surveys.example.org", "timeoutMs": 5000 },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LimercSettings {
    /// Remote endpoint location and timeouts.
    pub endpoint: EndpointSettings,
    /// Log output configuration.
    pub logging: LoggingSettings,
    /// Defaults for survey operations.
    pub survey: SurveySettings,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

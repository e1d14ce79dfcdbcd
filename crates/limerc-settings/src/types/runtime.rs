//! Logging and survey-default settings.

use serde::{Deserialize, Serialize};

/// Log output configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level (`trace`, `debug`, `info`, `warn`, `error`). `RUST_LOG`
    /// takes precedence when set.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Defaults applied by survey operations.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurveySettings {
    /// Language code for new surveys.
    pub default_language: String,
    /// Survey format passed to `add_survey` (`G` = group by group).
    pub format: String,
    /// Question type used when the caller gives none (`T` = long free text).
    pub default_question_type: String,
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            format: "G".to_string(),
            default_question_type: "T".to_string(),
        }
    }
}

//! Layered settings loading.
//!
//! Compiled defaults, then `~/.limerc/settings.json` merged over them, then
//! `LIMERC_*` environment variables. A missing file is not an error; an
//! unreadable or malformed one is.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::LimercSettings;

/// Accepted `LIMERC_TIMEOUT_MS` values.
const TIMEOUT_MS_RANGE: RangeInclusive<u64> = 100..=600_000;

/// `~/.limerc`, or `/tmp/.limerc` when `HOME` is unset.
pub fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".limerc")
}

/// `~/.limerc/settings.json`.
pub fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

/// Load from [`settings_path`] with environment overrides.
pub fn load_settings() -> Result<LimercSettings> {
    load_settings_from_path(&settings_path())
}

/// Load from `path` with environment overrides, then validate the endpoint.
///
/// A missing file yields defaults.
pub fn load_settings_from_path(path: &Path) -> Result<LimercSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings.endpoint.validate()?;
    Ok(settings)
}

/// Defaults merged with the file at `path`, without env overrides.
fn load_file_layer(path: &Path) -> Result<LimercSettings> {
    let parse_error = |source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let mut layered = serde_json::to_value(LimercSettings::default()).map_err(parse_error)?;

    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(path = %path.display(), "merging settings file");
            let user: Value = serde_json::from_str(&content).map_err(parse_error)?;
            layered = deep_merge(layered, user);
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file");
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    serde_json::from_value(layered).map_err(parse_error)
}

/// Merge `overlay` into `base`.
///
/// Objects merge key by key. Any other overlay value replaces the base value
/// outright, except `null`, which leaves the base untouched.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
                if value.is_null() {
                    continue;
                }
                let next = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                let _ = merged.insert(key, next);
            }
            Value::Object(merged)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Apply `LIMERC_*` overrides read through `lookup`.
///
/// Empty values are ignored. Values that do not parse are ignored with a
/// warning, leaving the file or default value in place.
pub fn apply_env_overrides<F>(settings: &mut LimercSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    if let Some(v) = env.string("LIMERC_BASE_URL") {
        settings.endpoint.base_url = v;
    }
    if let Some(v) = env.string("LIMERC_ENDPOINT_PATH") {
        settings.endpoint.path = v;
    }
    if let Some(v) = env.u64_in("LIMERC_TIMEOUT_MS", &TIMEOUT_MS_RANGE) {
        settings.endpoint.timeout_ms = v;
    }

    if let Some(v) = env.string("LIMERC_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = env.bool("LIMERC_LOG_JSON") {
        settings.logging.json = v;
    }

    if let Some(v) = env.string("LIMERC_SURVEY_LANGUAGE") {
        settings.survey.default_language = v;
    }
}

/// Accepted spellings: `true`/`1`/`yes`/`on` and `false`/`0`/`no`/`off`,
/// in any case.
pub fn parse_bool(val: &str) -> Option<bool> {
    const TRUE: [&str; 4] = ["true", "1", "yes", "on"];
    const FALSE: [&str; 4] = ["false", "0", "no", "off"];
    let val = val.trim();
    if TRUE.iter().any(|t| t.eq_ignore_ascii_case(val)) {
        Some(true)
    } else if FALSE.iter().any(|f| f.eq_ignore_ascii_case(val)) {
        Some(false)
    } else {
        None
    }
}

/// An unsigned integer inside `range`.
pub fn parse_u64_in(val: &str, range: &RangeInclusive<u64>) -> Option<u64> {
    val.trim().parse().ok().filter(|n| range.contains(n))
}

/// Reads `LIMERC_*` values through an injected lookup.
struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    /// Parse a non-empty value, warning when it does not parse.
    fn parsed<T>(&self, name: &str, expected: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let raw = self.string(name)?;
        let value = parse(&raw);
        if value.is_none() {
            warn!(var = name, value = %raw, expected, "ignoring environment override");
        }
        value
    }

    fn bool(&self, name: &str) -> Option<bool> {
        self.parsed(name, "a boolean", parse_bool)
    }

    fn u64_in(&self, name: &str, range: &RangeInclusive<u64>) -> Option<u64> {
        let expected = format!("an integer in {}..={}", range.start(), range.end());
        self.parsed(name, &expected, |v| parse_u64_in(v, range))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

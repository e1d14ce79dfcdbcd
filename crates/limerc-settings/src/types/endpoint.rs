//! Remote endpoint settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Where the RemoteControl endpoint lives and how long a round trip may take.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointSettings {
    /// Scheme and host of the survey installation.
    pub base_url: String,
    /// Path of the JSON-RPC endpoint under `base_url`.
    pub path: String,
    /// Per-round-trip timeout in milliseconds.
    pub timeout_ms: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            base_url: "https://limesurvey-app.fly.dev".to_string(),
            path: "/index.php/admin/remotecontrol".to_string(),
            timeout_ms: 10_000,
            user_agent: concat!("limerc/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl EndpointSettings {
    /// Full endpoint URL, joining `base_url` and `path` with exactly one `/`.
    pub fn url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }

    /// Timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reject settings that cannot produce a usable endpoint.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SettingsError::InvalidValue(format!(
                "endpoint.baseUrl must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "endpoint.timeoutMs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

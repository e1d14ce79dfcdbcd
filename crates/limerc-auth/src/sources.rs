//! Credential sources.
//!
//! Credentials are an injected capability: the client asks a
//! [`CredentialSource`] each time it logs in and never falls back to a
//! built-in account.

use std::sync::Arc;

use limerc_core::Credentials;

use crate::errors::AuthError;
use crate::storage;

/// Default environment variable for the username.
pub const USERNAME_VAR: &str = "LIMESURVEY_USERNAME";

/// Default environment variable for the password.
pub const PASSWORD_VAR: &str = "LIMESURVEY_PASSWORD";

/// Something that can supply a username and password.
pub trait CredentialSource: Send + Sync {
    /// Resolve credentials, or explain why none are available.
    fn credentials(&self) -> Result<Credentials, AuthError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Fixed credentials supplied by the caller.
#[derive(Clone, Debug)]
pub struct StaticCredentials(Credentials);

impl StaticCredentials {
    /// Wrap a credential pair.
    pub fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }
}

impl CredentialSource for StaticCredentials {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        if self.0.is_complete() {
            Ok(self.0.clone())
        } else {
            Err(AuthError::NotConfigured(
                "static credentials are incomplete".to_string(),
            ))
        }
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Credentials read from environment variables on every call.
///
/// Empty values count as unset.
#[derive(Clone, Debug)]
pub struct EnvCredentials {
    username_var: String,
    password_var: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(USERNAME_VAR, PASSWORD_VAR)
    }
}

impl EnvCredentials {
    /// Read from custom variable names.
    pub fn new(username_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        Self {
            username_var: username_var.into(),
            password_var: password_var.into(),
        }
    }

    fn resolve<F>(&self, lookup: F) -> Result<Credentials, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AuthError::NotConfigured(format!("{name} is not set")))
        };
        Ok(Credentials::new(
            read(&self.username_var)?,
            read(&self.password_var)?,
        ))
    }
}

impl CredentialSource for EnvCredentials {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        self.resolve(|name| std::env::var(name).ok())
    }

    fn describe(&self) -> String {
        format!("env:{}/{}", self.username_var, self.password_var)
    }
}

/// Credentials stored in a JSON file (see [`storage`]).
#[derive(Clone, Debug)]
pub struct FileCredentials {
    path: std::path::PathBuf,
}

impl FileCredentials {
    /// Read from `path`.
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for FileCredentials {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        storage::load_credentials(&self.path)?.ok_or_else(|| {
            AuthError::NotConfigured(format!("{} does not exist", self.path.display()))
        })
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// Tries each source in order; the first that yields credentials wins.
#[derive(Clone, Default)]
pub struct ChainedCredentials {
    sources: Vec<Arc<dyn CredentialSource>>,
}

impl ChainedCredentials {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source.
    #[must_use]
    pub fn with(mut self, source: Arc<dyn CredentialSource>) -> Self {
        self.sources.push(source);
        self
    }
}

impl CredentialSource for ChainedCredentials {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        let mut reasons = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            match source.credentials() {
                Ok(creds) => {
                    tracing::debug!(source = %source.describe(), "credentials resolved");
                    return Ok(creds);
                }
                Err(e) => reasons.push(format!("{}: {e}", source.describe())),
            }
        }
        if reasons.is_empty() {
            reasons.push("no credential sources configured".to_string());
        }
        Err(AuthError::NotConfigured(reasons.join("; ")))
    }

    fn describe(&self) -> String {
        let names: Vec<String> = self.sources.iter().map(|s| s.describe()).collect();
        format!("chain[{}]", names.join(", "))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

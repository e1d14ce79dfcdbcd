//! Session credential state.
//!
//! A [`Session`] is either [`SessionState::None`] or [`SessionState::Active`]
//! with an opaque token. Only the session manager moves it between the two:
//! `None → Active` on a successful login, `Active → None` on release.

use std::fmt;

/// Lifecycle state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No token held.
    None,
    /// A token was issued and has not been released.
    Active,
}

/// Opaque session credential issued by `get_session_key`.
///
/// `Debug` shows a redacted token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    /// A session that holds nothing.
    pub fn none() -> Self {
        Self { token: None }
    }

    /// An active session carrying `token`.
    pub fn active(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        if self.token.is_some() {
            SessionState::Active
        } else {
            SessionState::None
        }
    }

    /// Whether a token is held.
    pub fn is_active(&self) -> bool {
        self.token.is_some()
    }

    /// The token, if active.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Move to `None`, returning the token that was held.
    pub fn take(&mut self) -> Option<String> {
        self.token.take()
    }

    /// Token prefix safe for logs.
    pub fn redacted(&self) -> String {
        self.token.as_deref().map_or_else(|| "<none>".to_string(), redact_token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("token", &self.redacted())
            .finish()
    }
}

/// Keep the first four characters of a token.
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}…")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

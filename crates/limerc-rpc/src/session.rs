//! Session lifecycle.
//!
//! [`SessionManager`] owns the single [`Session`] of a client:
//!
//! ```text
//! None --acquire(ok)--> Active --release--> None
//! None --acquire(fail)--> None
//! ```
//!
//! Acquiring while active releases the held session first. Release never
//! fails from the caller's point of view: the state returns to `None` even
//! when the teardown call errors, and the error is only logged.

use std::sync::Arc;
use std::time::Duration;

use limerc_core::{Credentials, RpcEnvelope, RpcOutcome, Session, SessionState, redact_token};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::errors::RpcError;
use crate::transport::{IdSequence, Transport, round_trip};

/// Login method.
pub const GET_SESSION_KEY: &str = "get_session_key";

/// Logout method.
pub const RELEASE_SESSION_KEY: &str = "release_session_key";

/// Login status the remote returns instead of a key for bad credentials.
///
/// The remote reports this as a `{"status": ...}` result rather than an
/// RPC error. The exact wording is not a documented contract.
pub const INVALID_CREDENTIALS_STATUS: &str = "Invalid user name or password";

/// Owns one session credential.
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    timeout: Duration,
    ids: Arc<IdSequence>,
    session: Session,
}

impl SessionManager {
    /// Create a manager with no session.
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration, ids: Arc<IdSequence>) -> Self {
        Self {
            transport,
            timeout,
            ids,
            session: Session::none(),
        }
    }

    /// Current session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Log in and hold the issued session key.
    ///
    /// Returns the token on success. On failure the state is `None`.
    #[tracing::instrument(skip_all, fields(username = %credentials.username))]
    pub async fn acquire(&mut self, credentials: &Credentials) -> Result<&str, RpcError> {
        if self.session.is_active() {
            info!("session already active, releasing before login");
            self.release().await;
        }

        let envelope = RpcEnvelope::new(
            GET_SESSION_KEY,
            vec![
                json!(credentials.username),
                json!(credentials.password),
            ],
            self.ids.next_id(),
        );

        let outcome = round_trip(self.transport.as_ref(), &envelope, self.timeout).await?;
        let token = match outcome {
            RpcOutcome::Success(result) => session_key_from_result(result)?,
            RpcOutcome::Fault(fault) => {
                return Err(RpcError::Authentication {
                    message: fault.to_string(),
                });
            }
        };

        info!(token = %redact_token(&token), "session acquired");
        self.session = Session::active(token);
        Ok(self.session.token().unwrap_or_default())
    }

    /// Release the held session, if any.
    ///
    /// Idempotent. Teardown failures are logged and swallowed; the state is
    /// `None` afterwards in every case.
    pub async fn release(&mut self) {
        let Some(token) = self.session.take() else {
            debug!("no active session to release");
            return;
        };
        let redacted = redact_token(&token);

        let envelope = RpcEnvelope::new(RELEASE_SESSION_KEY, vec![json!(token)], self.ids.next_id());
        match round_trip(self.transport.as_ref(), &envelope, self.timeout).await {
            Ok(RpcOutcome::Success(_)) => info!(token = %redacted, "session released"),
            Ok(RpcOutcome::Fault(fault)) => {
                warn!(token = %redacted, error = %fault, "remote rejected session release");
            }
            Err(fault) => {
                warn!(token = %redacted, kind = %fault.kind, error = %fault, "session release failed");
            }
        }
    }
}

/// Extract the session key from a `get_session_key` result.
///
/// Only a non-empty string that is not the failure status counts as a key.
fn session_key_from_result(result: Value) -> Result<String, RpcError> {
    match result {
        Value::String(key) if key.trim().is_empty() => Err(RpcError::Authentication {
            message: "empty session key".to_string(),
        }),
        Value::String(key) if key == INVALID_CREDENTIALS_STATUS => Err(RpcError::Authentication {
            message: key,
        }),
        Value::String(key) => Ok(key),
        Value::Object(obj) => {
            let message = match obj.get("status") {
                Some(Value::String(status)) => status.clone(),
                Some(other) => other.to_string(),
                None => "login returned an object instead of a session key".to_string(),
            };
            Err(RpcError::Authentication { message })
        }
        Value::Null => Err(RpcError::Authentication {
            message: "no session key returned".to_string(),
        }),
        other => Err(RpcError::Authentication {
            message: format!("unexpected session key {other}"),
        }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use limerc_core::{RpcFault, TransportFault, TransportFaultKind};
    use limerc_logging::capture_logs;
    use tracing::Level;

    use crate::testing::{DEFAULT_TOKEN, Reply, ScriptedTransport};

    fn manager(transport: &Arc<ScriptedTransport>) -> SessionManager {
        SessionManager::new(
            transport.clone(),
            Duration::from_secs(10),
            Arc::new(IdSequence::new()),
        )
    }

    fn creds() -> Credentials {
        Credentials::new("admin", "s3cret")
    }

    #[tokio::test]
    async fn acquire_sends_login_without_token_prefix() {
        let transport = ScriptedTransport::new();
        let mut sessions = manager(&transport);

        let token = sessions.acquire(&creds()).await.unwrap().to_string();
        assert_eq!(token, DEFAULT_TOKEN);
        assert_eq!(sessions.state(), SessionState::Active);

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method(), GET_SESSION_KEY);
        assert_eq!(calls[0].params(), &[json!("admin"), json!("s3cret")]);
        assert_eq!(calls[0].correlation_id(), 1);
    }

    #[tokio::test]
    async fn sentinel_status_is_authentication_fault() {
        let transport = ScriptedTransport::new();
        transport.on(
            GET_SESSION_KEY,
            Reply::Ok(json!({"status": INVALID_CREDENTIALS_STATUS})),
        );
        let mut sessions = manager(&transport);

        let err = sessions.acquire(&creds()).await.unwrap_err();
        assert_matches!(err, RpcError::Authentication { ref message } => {
            assert_eq!(message, INVALID_CREDENTIALS_STATUS);
        });
        assert_eq!(sessions.state(), SessionState::None);
    }

    #[tokio::test]
    async fn empty_and_odd_results_are_authentication_faults() {
        for result in [json!(""), json!(null), json!(42), json!(INVALID_CREDENTIALS_STATUS)] {
            let transport = ScriptedTransport::new();
            transport.on(GET_SESSION_KEY, Reply::Ok(result.clone()));
            let mut sessions = manager(&transport);

            let err = sessions.acquire(&creds()).await.unwrap_err();
            assert!(
                matches!(err, RpcError::Authentication { .. }),
                "{result} should be rejected"
            );
            assert_eq!(sessions.state(), SessionState::None);
        }
    }

    #[tokio::test]
    async fn login_fault_is_authentication_fault() {
        let transport = ScriptedTransport::new();
        transport.on(GET_SESSION_KEY, Reply::Fault(RpcFault::new("Login disabled")));
        let mut sessions = manager(&transport);

        let err = sessions.acquire(&creds()).await.unwrap_err();
        assert!(err.to_string().contains("Login disabled"));
    }

    #[tokio::test]
    async fn login_transport_fault_propagates_unchanged() {
        let transport = ScriptedTransport::new();
        transport.on(
            GET_SESSION_KEY,
            Reply::Transport(TransportFault::dns_failure("no such host")),
        );
        let mut sessions = manager(&transport);

        let err = sessions.acquire(&creds()).await.unwrap_err();
        assert_matches!(err, RpcError::Transport(fault) => {
            assert_eq!(fault.kind, TransportFaultKind::DnsFailure);
            assert_eq!(fault.detail, "no such host");
        });
        assert_eq!(sessions.state(), SessionState::None);
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let transport = ScriptedTransport::new();
        let mut sessions = manager(&transport);
        let _ = sessions.acquire(&creds()).await.unwrap();

        sessions.release().await;
        assert_eq!(sessions.state(), SessionState::None);
        sessions.release().await;
        assert_eq!(sessions.state(), SessionState::None);

        assert_eq!(transport.count(RELEASE_SESSION_KEY), 1);
        let release = &transport.calls()[1];
        assert_eq!(release.params(), &[json!(DEFAULT_TOKEN)]);
    }

    #[tokio::test]
    async fn release_without_session_sends_nothing() {
        let transport = ScriptedTransport::new();
        let mut sessions = manager(&transport);
        sessions.release().await;
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn release_failure_is_logged_and_swallowed() {
        let (logs, _guard) = capture_logs();
        let transport = ScriptedTransport::new();
        transport.on(
            RELEASE_SESSION_KEY,
            Reply::Transport(TransportFault::connection_refused("os error 111")),
        );
        let mut sessions = manager(&transport);
        let _ = sessions.acquire(&creds()).await.unwrap();

        sessions.release().await;
        assert_eq!(sessions.state(), SessionState::None);
        assert!(logs.has_event(Level::WARN, "session release failed"));
        assert!(!logs.contains_anywhere(DEFAULT_TOKEN));
        assert!(!logs.contains_anywhere("s3cret"));
    }

    #[tokio::test]
    async fn release_remote_fault_is_swallowed() {
        let transport = ScriptedTransport::new();
        transport.on(RELEASE_SESSION_KEY, Reply::Fault(RpcFault::new("Invalid session key")));
        let mut sessions = manager(&transport);
        let _ = sessions.acquire(&creds()).await.unwrap();

        sessions.release().await;
        assert_eq!(sessions.state(), SessionState::None);
    }

    #[tokio::test]
    async fn acquire_while_active_releases_first() {
        let transport = ScriptedTransport::new();
        transport.on(GET_SESSION_KEY, Reply::Ok(json!("first")));
        transport.on(GET_SESSION_KEY, Reply::Ok(json!("second")));
        let mut sessions = manager(&transport);

        let _ = sessions.acquire(&creds()).await.unwrap();
        let token = sessions.acquire(&creds()).await.unwrap().to_string();
        assert_eq!(token, "second");

        assert_eq!(
            transport.methods(),
            [GET_SESSION_KEY, RELEASE_SESSION_KEY, GET_SESSION_KEY]
        );
        assert_eq!(transport.calls()[1].params(), &[json!("first")]);
    }
}

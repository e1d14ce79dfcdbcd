//! Request dispatch with scoped sessions.
//!
//! [`RpcDispatcher::execute`] runs one call inside its own session:
//!
//! 1. normalize the call
//! 2. acquire a session (a failure here ends the call; nothing to release)
//! 3. send `[token, ...args]`
//! 4. release the session, whatever step 3 produced
//! 5. return the outcome, or the captured error
//!
//! [`RpcDispatcher::with_session`] is the general form: several calls share
//! one token, and the release in step 4 also runs when the scoped future
//! returns an error or panics. Nothing is retried.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use limerc_core::{CallRequest, Credentials, RpcEnvelope, RpcOutcome, SessionState};
use limerc_settings::EndpointSettings;
use serde_json::Value;
use tracing::{Span, debug, field, warn};

use crate::errors::RpcError;
use crate::normalize::normalize;
use crate::session::SessionManager;
use crate::transport::{HttpTransport, IdSequence, Transport, round_trip};

/// Issues calls on behalf of one logical caller.
///
/// Calls take `&mut self`, so one call (including its release) completes
/// before the next begins. Use one dispatcher per concurrent caller.
pub struct RpcDispatcher {
    transport: Arc<dyn Transport>,
    sessions: SessionManager,
    timeout: Duration,
    ids: Arc<IdSequence>,
}

impl RpcDispatcher {
    /// Create a dispatcher over `transport` with a per-round-trip `timeout`.
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        let ids = Arc::new(IdSequence::new());
        Self {
            sessions: SessionManager::new(transport.clone(), timeout, ids.clone()),
            transport,
            timeout,
            ids,
        }
    }

    /// Create a dispatcher that speaks HTTP to the configured endpoint.
    pub fn from_settings(settings: &EndpointSettings) -> Result<Self, RpcError> {
        let transport = HttpTransport::from_settings(settings)?;
        Ok(Self::new(Arc::new(transport), settings.timeout()))
    }

    /// Per-round-trip timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// State of the underlying session. `None` between calls.
    pub fn session_state(&self) -> SessionState {
        self.sessions.state()
    }

    /// Run one call in a fresh session.
    ///
    /// A remote fault is returned as [`RpcOutcome::Fault`]; authentication
    /// and transport failures are returned as errors. The session is
    /// released before this returns in every case.
    #[tracing::instrument(skip_all, fields(method = field::Empty))]
    pub async fn execute(
        &mut self,
        call: CallRequest,
        credentials: &Credentials,
    ) -> Result<RpcOutcome, RpcError> {
        let normalized = normalize(call);
        if normalized.method.is_empty() {
            return Err(RpcError::InvalidRequest("no method name given".to_string()));
        }
        let _ = Span::current().record("method", normalized.method.as_str());

        let outcome = self
            .with_session(credentials, |caller| async move {
                caller.call(&normalized.method, normalized.args).await
            })
            .await;

        match &outcome {
            Ok(RpcOutcome::Fault(fault)) => warn!(error = %fault, "remote method reported an error"),
            Err(e) => warn!(category = e.category(), error = %e, "call failed"),
            Ok(RpcOutcome::Success(_)) => debug!("call succeeded"),
        }
        outcome
    }

    /// Run `scope` with a live session, releasing it afterwards.
    ///
    /// The session is acquired once; every call made through the
    /// [`SessionCaller`] shares its token. Release happens after `scope`
    /// completes, fails, or panics (the panic is resumed after release).
    pub async fn with_session<T, F, Fut>(
        &mut self,
        credentials: &Credentials,
        scope: F,
    ) -> Result<T, RpcError>
    where
        F: FnOnce(SessionCaller) -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        let token = self.sessions.acquire(credentials).await?.to_string();
        let caller = SessionCaller {
            transport: self.transport.clone(),
            token,
            timeout: self.timeout,
            ids: self.ids.clone(),
        };

        let result = AssertUnwindSafe(scope(caller)).catch_unwind().await;
        self.sessions.release().await;

        match result {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Issues calls under a session token held by [`RpcDispatcher::with_session`].
#[derive(Clone)]
pub struct SessionCaller {
    transport: Arc<dyn Transport>,
    token: String,
    timeout: Duration,
    ids: Arc<IdSequence>,
}

impl SessionCaller {
    /// Call `method` with `[token, ...args]`.
    pub async fn call(&self, method: &str, args: Vec<Value>) -> Result<RpcOutcome, RpcError> {
        let mut params = Vec::with_capacity(args.len() + 1);
        params.push(Value::String(self.token.clone()));
        params.extend(args);

        let envelope = RpcEnvelope::new(method, params, self.ids.next_id());
        debug!(method, id = envelope.correlation_id(), "dispatching");
        Ok(round_trip(self.transport.as_ref(), &envelope, self.timeout).await?)
    }

    /// Call `method` and turn a remote fault into [`RpcError::Remote`].
    pub async fn call_value(&self, method: &str, args: Vec<Value>) -> Result<Value, RpcError> {
        self.call(method, args)
            .await?
            .into_result()
            .map_err(|fault| RpcError::Remote {
                method: method.to_string(),
                fault,
            })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! RPC client error types.
//!
//! Three fault classes reach callers: authentication failures, transport
//! failures, and remote (application-level) faults. Remote faults returned
//! by [`execute`](crate::RpcDispatcher::execute) are an
//! [`RpcOutcome::Fault`](limerc_core::RpcOutcome::Fault), not an error; they
//! only become [`RpcError::Remote`] when a typed operation needs a value.

use limerc_auth::AuthError;
use limerc_core::{RpcFault, TransportFault, TransportFaultKind};

/// Result type alias for RPC client operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Errors that can occur while talking to the RemoteControl endpoint.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Login was rejected or returned no usable session key.
    #[error("authentication failed: {message}")]
    Authentication {
        /// Reason reported by the remote, or a description of the bad result.
        message: String,
    },

    /// The network layer could not complete the exchange.
    #[error("transport error: {0}")]
    Transport(#[from] TransportFault),

    /// The remote method reported an error.
    #[error("remote error in {method}: {fault}")]
    Remote {
        /// Method that failed.
        method: String,
        /// Fault payload.
        fault: RpcFault,
    },

    /// The call could not be built (e.g. no method name).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No credentials could be resolved for login.
    #[error("credentials unavailable: {0}")]
    Credentials(#[from] AuthError),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    /// A named survey operation failed.
    #[error("failed to {operation}: {source}")]
    Operation {
        /// Operation in plain words (`list surveys`).
        operation: &'static str,
        /// Underlying error.
        #[source]
        source: Box<RpcError>,
    },
}

impl RpcError {
    /// Wrap with the name of the operation that failed.
    #[must_use]
    pub fn during(self, operation: &'static str) -> Self {
        Self::Operation {
            operation,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through [`RpcError::Operation`].
    pub fn root(&self) -> &Self {
        match self {
            Self::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Transport fault kind, if this is (or wraps) a transport error.
    pub fn transport_kind(&self) -> Option<TransportFaultKind> {
        match self.root() {
            Self::Transport(fault) => Some(fault.kind),
            _ => None,
        }
    }

    /// Error category string for logs.
    pub fn category(&self) -> &'static str {
        match self.root() {
            Self::Authentication { .. } | Self::Credentials(_) => "auth",
            Self::Transport(fault) if fault.is_timeout() => "timeout",
            Self::Transport(_) | Self::Client(_) => "network",
            Self::Remote { .. } => "rpc",
            Self::InvalidRequest(_) => "invalid",
            Self::Operation { .. } => "unknown",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

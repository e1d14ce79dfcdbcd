//! JSON-RPC wire model.
//!
//! Requests go out as `{"method": ..., "params": [...], "id": n}`. Replies
//! carry either a `result` or a non-null `error`, which map onto
//! [`RpcOutcome::Success`] and [`RpcOutcome::Fault`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound request. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RpcEnvelope {
    method: String,
    params: Vec<Value>,
    #[serde(rename = "id")]
    correlation_id: u64,
}

impl RpcEnvelope {
    /// Build an envelope.
    ///
    /// For every method except `get_session_key`, `params[0]` must be the
    /// session token.
    pub fn new(method: impl Into<String>, params: Vec<Value>, correlation_id: u64) -> Self {
        Self {
            method: method.into(),
            params,
            correlation_id,
        }
    }

    /// Remote method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Positional parameters.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Caller-assigned correlation id, echoed by the peer.
    pub fn correlation_id(&self) -> u64 {
        self.correlation_id
    }
}

/// Application-level error reported by the remote method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcFault {
    /// Human-readable message.
    pub message: String,
    /// Optional remote error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
}

impl RpcFault {
    /// Create a fault without a code.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    /// Interpret the reply's `error` member.
    ///
    /// Objects contribute `message` and `code`; any other value (LimeSurvey
    /// sometimes answers with a bare string) becomes the message verbatim.
    pub fn from_error_value(error: &Value) -> Self {
        match error {
            Value::Object(obj) => {
                let message = match obj.get("message") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => error.to_string(),
                };
                Self {
                    message,
                    code: obj.get("code").filter(|c| !c.is_null()).cloned(),
                }
            }
            Value::String(s) => Self::new(s.clone()),
            other => Self::new(other.to_string()),
        }
    }
}

impl fmt::Display for RpcFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (code {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RpcFault {}

/// Outcome of a completed round trip: a result payload or a remote fault,
/// never both.
#[derive(Clone, Debug, PartialEq)]
pub enum RpcOutcome {
    /// The method's `result` payload.
    Success(Value),
    /// The method's `error` payload.
    Fault(RpcFault),
}

impl RpcOutcome {
    /// Whether the remote reported an error.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }

    /// Convert into a `Result`, treating a remote fault as the error.
    pub fn into_result(self) -> Result<Value, RpcFault> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Fault(fault) => Err(fault),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

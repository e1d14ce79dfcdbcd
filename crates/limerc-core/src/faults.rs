//! Transport-level failures.

use std::fmt;

/// Why the network layer could not complete an exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportFaultKind {
    /// The peer actively refused, or the connection could not be opened.
    ConnectionRefused,
    /// The endpoint host name did not resolve.
    DnsFailure,
    /// The round trip exceeded the per-call timeout.
    Timeout,
    /// Non-success HTTP status, or a body that is not a JSON-RPC reply.
    ProtocolError,
}

impl TransportFaultKind {
    /// Stable lowercase name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConnectionRefused => "connection_refused",
            Self::DnsFailure => "dns_failure",
            Self::Timeout => "timeout",
            Self::ProtocolError => "protocol_error",
        }
    }
}

impl fmt::Display for TransportFaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified transport failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct TransportFault {
    /// Failure class.
    pub kind: TransportFaultKind,
    /// Free-form detail from the network layer.
    pub detail: String,
}

impl TransportFault {
    /// Create a fault.
    pub fn new(kind: TransportFaultKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Connection refused.
    pub fn connection_refused(detail: impl Into<String>) -> Self {
        Self::new(TransportFaultKind::ConnectionRefused, detail)
    }

    /// DNS lookup failed.
    pub fn dns_failure(detail: impl Into<String>) -> Self {
        Self::new(TransportFaultKind::DnsFailure, detail)
    }

    /// Timed out.
    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::new(TransportFaultKind::Timeout, detail)
    }

    /// Protocol error.
    pub fn protocol(detail: impl Into<String>) -> Self {
        Self::new(TransportFaultKind::ProtocolError, detail)
    }

    /// Whether this is a timeout.
    pub fn is_timeout(&self) -> bool {
        self.kind == TransportFaultKind::Timeout
    }
}

//! # limerc-core
//!
//! Foundation types shared by every limerc crate:
//!
//! - [`CallRequest`]: caller-facing input (free-form command, positional call,
//!   or structured call with a named-field bag)
//! - [`RpcEnvelope`] / [`RpcOutcome`] / [`RpcFault`]: the JSON-RPC wire model
//! - [`Session`] / [`SessionState`]: the session credential state machine
//! - [`Credentials`]: username/password pair with a redacted `Debug`
//! - [`TransportFault`] / [`TransportFaultKind`]: classified network failures

#![deny(unsafe_code)]

pub mod call;
pub mod credentials;
pub mod envelope;
pub mod faults;
pub mod session;

pub use call::{CallParseError, CallRequest, FieldBag};
pub use credentials::Credentials;
pub use envelope::{RpcEnvelope, RpcFault, RpcOutcome};
pub use faults::{TransportFault, TransportFaultKind};
pub use session::{Session, SessionState, redact_token};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! # limerc-rpc
//!
//! Session-scoped JSON-RPC client for the LimeSurvey RemoteControl API.
//!
//! Every call runs inside its own session:
//! `get_session_key` → method → `release_session_key`. The release runs on
//! every exit path once a session was acquired.
//!
//! - [`normalize`]: free-form / positional / structured calls → positional params
//! - [`transport`]: the [`Transport`] trait, [`HttpTransport`], per-call timeout
//! - [`session`]: [`SessionManager`] (acquire / idempotent release)
//! - [`dispatcher`]: [`RpcDispatcher`] (`execute`, `with_session`)
//! - [`survey`]: typed survey operations ([`SurveyClient`])
//! - [`tools`]: named text-in / text-out tools ([`SurveyTool`], [`invoke`])

#![deny(unsafe_code)]

pub mod dispatcher;
pub mod errors;
pub mod normalize;
pub mod session;
pub mod survey;
pub mod tools;
pub mod transport;

#[cfg(test)]
mod testing;

pub use dispatcher::{RpcDispatcher, SessionCaller};
pub use errors::{RpcError, RpcResult};
pub use normalize::{NormalizedCall, normalize};
pub use session::SessionManager;
pub use survey::SurveyClient;
pub use tools::{SurveyTool, UnknownTool, invoke, render_error, render_value};
pub use transport::{HttpTransport, IdSequence, Transport, decode_reply, round_trip};

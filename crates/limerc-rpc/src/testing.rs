//! In-memory transport for unit tests.
//!
//! Replies are queued per method; when a method's queue is empty a default
//! applies (`get_session_key` → `"tok-1"`, anything else → `"OK"`). Every
//! envelope is recorded so tests can count acquire/release calls.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use limerc_core::{RpcEnvelope, RpcFault, RpcOutcome, TransportFault};
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::transport::Transport;

/// Token handed out by the default login reply.
pub(crate) const DEFAULT_TOKEN: &str = "tok-1";

/// One scripted reply.
#[derive(Clone, Debug)]
pub(crate) enum Reply {
    /// `result` payload.
    Ok(Value),
    /// `error` payload.
    Fault(RpcFault),
    /// Transport failure.
    Transport(TransportFault),
    /// Never answer.
    Hang,
}

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<RpcEnvelope>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a reply for `method`.
    pub(crate) fn on(&self, method: &str, reply: Reply) {
        self.replies
            .lock()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn calls(&self) -> Vec<RpcEnvelope> {
        self.calls.lock().clone()
    }

    pub(crate) fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .map(|e| e.method().to_string())
            .collect()
    }

    pub(crate) fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|e| e.method() == method)
            .count()
    }

    fn next_reply(&self, method: &str) -> Reply {
        let queued = self
            .replies
            .lock()
            .get_mut(method)
            .and_then(VecDeque::pop_front);
        queued.unwrap_or_else(|| match method {
            "get_session_key" => Reply::Ok(json!(DEFAULT_TOKEN)),
            _ => Reply::Ok(json!("OK")),
        })
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        envelope: &RpcEnvelope,
        _timeout: Duration,
    ) -> Result<RpcOutcome, TransportFault> {
        self.calls.lock().push(envelope.clone());
        match self.next_reply(envelope.method()) {
            Reply::Ok(value) => Ok(RpcOutcome::Success(value)),
            Reply::Fault(fault) => Ok(RpcOutcome::Fault(fault)),
            Reply::Transport(fault) => Err(fault),
            Reply::Hang => {
                std::future::pending::<()>().await;
                Err(TransportFault::protocol("unreachable"))
            }
        }
    }
}

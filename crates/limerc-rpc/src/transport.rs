//! Transport channel.
//!
//! A [`Transport`] delivers one [`RpcEnvelope`] and returns the decoded
//! [`RpcOutcome`], or a classified [`TransportFault`] when the exchange could
//! not be completed. [`HttpTransport`] is the production implementation
//! (one `reqwest` POST per envelope); [`round_trip`] adds the per-call
//! timeout that applies to every transport.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use limerc_core::{RpcEnvelope, RpcFault, RpcOutcome, TransportFault};
use limerc_settings::EndpointSettings;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::errors::RpcError;

/// Longest response excerpt kept in a protocol error.
const MAX_BODY_EXCERPT: usize = 200;

/// Delivers JSON-RPC envelopes. Stateless across calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one envelope and decode the reply.
    async fn send(
        &self,
        envelope: &RpcEnvelope,
        timeout: Duration,
    ) -> Result<RpcOutcome, TransportFault>;
}

/// Send through `transport`, failing with a timeout fault after `timeout`.
pub async fn round_trip(
    transport: &dyn Transport,
    envelope: &RpcEnvelope,
    timeout: Duration,
) -> Result<RpcOutcome, TransportFault> {
    match tokio::time::timeout(timeout, transport.send(envelope, timeout)).await {
        Ok(result) => result,
        Err(_) => Err(TransportFault::timeout(format!(
            "{} got no reply within {}ms",
            envelope.method(),
            timeout.as_millis()
        ))),
    }
}

/// Monotonic correlation id source, starting at 1.
#[derive(Debug)]
pub struct IdSequence(AtomicU64);

impl IdSequence {
    /// New sequence.
    pub fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    /// Take the next id.
    pub fn next_id(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP transport
// ─────────────────────────────────────────────────────────────────────────────

/// JSON-RPC over HTTP POST, backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// Create a transport for the given endpoint URL.
    pub fn new(url: impl Into<String>, user_agent: &str) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| RpcError::Client(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Create a transport from endpoint settings.
    pub fn from_settings(settings: &EndpointSettings) -> Result<Self, RpcError> {
        Self::new(settings.url(), &settings.user_agent)
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip_all, fields(method = envelope.method(), id = envelope.correlation_id()))]
    async fn send(
        &self,
        envelope: &RpcEnvelope,
        timeout: Duration,
    ) -> Result<RpcOutcome, TransportFault> {
        debug!(url = %self.url, params = envelope.params().len(), "sending request");

        let response = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(envelope)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(TransportFault::protocol(format!(
                "HTTP {}: {}",
                status.as_u16(),
                excerpt(&text)
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        let outcome = decode_reply(&body)?;
        debug!(fault = outcome.is_fault(), "reply decoded");
        Ok(outcome)
    }
}

/// Decode a JSON-RPC reply body.
///
/// A non-null `error` member yields [`RpcOutcome::Fault`]; otherwise the
/// `result` member (which may be `null`) yields [`RpcOutcome::Success`]. A
/// body that is not a JSON object with one of those members is a protocol
/// error.
pub fn decode_reply(body: &[u8]) -> Result<RpcOutcome, TransportFault> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        TransportFault::protocol(format!(
            "reply is not JSON ({e}): {}",
            excerpt(&String::from_utf8_lossy(body))
        ))
    })?;

    let Value::Object(mut reply) = value else {
        return Err(TransportFault::protocol("reply is not a JSON object"));
    };

    if let Some(error) = reply.remove("error").filter(|e| !e.is_null()) {
        return Ok(RpcOutcome::Fault(RpcFault::from_error_value(&error)));
    }

    reply
        .remove("result")
        .map(RpcOutcome::Success)
        .ok_or_else(|| TransportFault::protocol("reply has neither result nor error"))
}

/// Map a `reqwest` error onto a transport fault kind.
pub fn classify_reqwest_error(err: &reqwest::Error) -> TransportFault {
    let detail = error_chain(err);
    if err.is_timeout() {
        TransportFault::timeout(detail)
    } else if err.is_connect() {
        if looks_like_dns_failure(&detail) {
            TransportFault::dns_failure(detail)
        } else {
            TransportFault::connection_refused(detail)
        }
    } else {
        TransportFault::protocol(detail)
    }
}

/// Render an error and all of its sources on one line.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}

fn looks_like_dns_failure(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    lower.contains("dns error")
        || lower.contains("failed to lookup address")
        || lower.contains("name or service not known")
        || lower.contains("nodename nor servname")
        || lower.contains("no such host")
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_BODY_EXCERPT {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_BODY_EXCERPT).collect();
    format!("{cut}…")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

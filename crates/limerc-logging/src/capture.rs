//! Log capture for tests.
//!
//! [`capture_logs`] installs a thread-local subscriber that keeps every event
//! in memory. Tests use it to check what was logged, and that secrets
//! (passwords, full session keys) never were.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// One recorded event.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    /// Event level.
    pub level: Level,
    /// Module path the event came from.
    pub target: String,
    /// The `message` field, empty when the event had none.
    pub message: String,
    /// Every other field, rendered as text.
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    /// Rendered value of field `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn mentions(&self, needle: &str) -> bool {
        self.message.contains(needle) || self.fields.values().any(|v| v.contains(needle))
    }
}

/// Shared handle to the recorded events.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedLogs {
    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.0.lock().clone()
    }

    /// Whether some event's message contains `text`.
    pub fn has_message(&self, text: &str) -> bool {
        self.0.lock().iter().any(|e| e.message.contains(text))
    }

    /// Whether some event at `level` has a message containing `text`.
    pub fn has_event(&self, level: Level, text: &str) -> bool {
        self.0
            .lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(text))
    }

    /// Whether `needle` appears in any message or field value.
    pub fn contains_anywhere(&self, needle: &str) -> bool {
        self.0.lock().iter().any(|e| e.mentions(needle))
    }

    /// Number of events at `level`.
    pub fn count_at_level(&self, level: Level) -> usize {
        self.0.lock().iter().filter(|e| e.level == level).count()
    }

    fn push(&self, event: CapturedEvent) {
        self.0.lock().push(event);
    }
}

#[derive(Default)]
struct Recorder {
    message: String,
    fields: BTreeMap<String, String>,
}

impl Visit for Recorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }
}

impl Recorder {
    fn put(&mut self, field: &Field, rendered: String) {
        if field.name() == "message" {
            self.message = rendered;
        } else {
            let _ = self.fields.insert(field.name().to_string(), rendered);
        }
    }
}

struct CaptureLayer(CapturedLogs);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut recorder = Recorder::default();
        event.record(&mut recorder);
        let meta = event.metadata();
        self.0.push(CapturedEvent {
            level: *meta.level(),
            target: meta.target().to_string(),
            message: recorder.message,
            fields: recorder.fields,
        });
    }
}

/// Record every event on the current thread until the guard drops.
///
/// `#[tokio::test]` runs on a current-thread runtime, so async tests see
/// events from the code under test.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let guard = tracing_subscriber::registry()
        .with(CaptureLayer(logs.clone()))
        .with(LevelFilter::TRACE)
        .set_default();
    (logs, guard)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! Tracing setup for the room binary, plus an in-memory capture that tests use
//! to assert on what a room logged.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub const DEFAULT_FILTER: &str = "info,felt_room=debug,felt_engine=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global fmt subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`].
pub fn init_logging() -> Result<(), TryInitError> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::util::SubscriberInitExt;

    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish()
        .try_init()
}

/// Same filter as [`init_logging`], one JSON object per event.
pub fn init_json_logging() -> Result<(), TryInitError> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::util::SubscriberInitExt;

    fmt()
        .json()
        .with_env_filter(env_filter())
        .with_current_span(false)
        .finish()
        .try_init()
}

/// One recorded tracing event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Layer that keeps every event it sees. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer().clone()
    }

    pub fn clear(&self) {
        self.buffer().clear();
    }

    /// Events whose message contains `needle`.
    pub fn with_message(&self, needle: &str) -> Vec<CapturedEvent> {
        self.select(|e| e.message.contains(needle))
    }

    /// Events tagged with `room_id`.
    pub fn for_room(&self, room_id: &str) -> Vec<CapturedEvent> {
        self.select(|e| e.field("room_id") == Some(room_id))
    }

    fn select(&self, keep: impl Fn(&CapturedEvent) -> bool) -> Vec<CapturedEvent> {
        self.buffer().iter().filter(|e| keep(e)).cloned().collect()
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<CapturedEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldRecorder::default();
        event.record(&mut fields);
        let meta = event.metadata();
        self.buffer().push(CapturedEvent {
            level: *meta.level(),
            target: meta.target().to_string(),
            message: fields.message,
            fields: fields.values,
        });
    }
}

#[derive(Default)]
struct FieldRecorder {
    message: String,
    values: BTreeMap<String, String>,
}

impl FieldRecorder {
    fn put(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.values.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldRecorder {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{value:?}"));
    }
}

/// Process-wide capture for integration tests. Installed once as the global
/// subscriber and emptied on every call.
pub fn init_test_logging() -> LogCapture {
    static CAPTURE: OnceLock<LogCapture> = OnceLock::new();

    let capture = CAPTURE.get_or_init(|| {
        let capture = LogCapture::new();
        // another subscriber may already be installed in this test binary
        let _ = tracing::subscriber::set_global_default(
            Registry::default().with(capture.clone()),
        );
        capture
    });
    capture.clear();
    capture.clone()
}

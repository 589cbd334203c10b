//! Shared test utilities for integration tests.
//!
//! - `capture_logs` - records tracing events emitted on the current thread
//! - `test_provider` - provider over a fresh `MockStorageClient`

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use storage_provider::{MockStorageClient, ProviderConfig, StorageProviderAdapter};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, registry};

/// Account used by every test provider.
pub const TEST_ACCOUNT: &str = "W142hJk";

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Events recorded while the guard returned by [`capture_logs`] is alive.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<CapturedEvent>>>);

impl CapturedLogs {
    pub fn at(&self, level: Level) -> Vec<CapturedEvent> {
        self.0
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter(|event| event.level == level)
            .cloned()
            .collect()
    }

    /// Events at `level` whose `field` equals `value`.
    pub fn matching(&self, level: Level, field: &str, value: &str) -> usize {
        self.at(level)
            .iter()
            .filter(|event| event.field(field) == Some(value))
            .count()
    }
}

struct CaptureLayer {
    logs: CapturedLogs,
}

#[derive(Default)]
struct FieldVisitor(HashMap<String, String>);

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}"));
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.logs
            .0
            .lock()
            .expect("lock poisoned")
            .push(CapturedEvent {
                level: *event.metadata().level(),
                fields: visitor.0,
            });
    }
}

/// Routes tracing events on this thread into the returned log.
///
/// Use with the default current-thread `#[tokio::test]` runtime so spawned
/// tasks log on the same thread.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = registry().with(CaptureLayer { logs: logs.clone() });
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}

pub fn test_config() -> ProviderConfig {
    ProviderConfig::new("secret_test_key", TEST_ACCOUNT)
}

pub fn test_provider() -> (StorageProviderAdapter<MockStorageClient>, MockStorageClient) {
    let client = MockStorageClient::new(TEST_ACCOUNT);
    let provider = StorageProviderAdapter::with_client(test_config(), client.clone())
        .expect("test config is valid");
    (provider, client)
}

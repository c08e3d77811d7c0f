//! Structured logging setup. Mirrors the source's leveled, in-memory-ring
//! plus file sink: a `tracing_subscriber` layer keeps the most recent lines
//! in memory so user-visible failures can report a log excerpt without
//! re-reading the log file from disk.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

use crate::constants::MEMORY_LOG_CAPACITY;

/// Keeps the last `MEMORY_LOG_CAPACITY` formatted log lines in memory.
#[derive(Clone, Default)]
pub struct MemoryLog {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recent_lines(&self) -> Vec<String> {
        self.lines.lock().expect("memory log mutex poisoned").iter().cloned().collect()
    }

    fn push(&self, line: String) {
        let mut lines = self.lines.lock().expect("memory log mutex poisoned");
        if lines.len() >= MEMORY_LOG_CAPACITY {
            lines.pop_front();
        }
        lines.push_back(line);
    }
}

/// A `tracing_subscriber::Layer` that renders each event into a plain line
/// and appends it to a `MemoryLog`.
pub struct MemoryLogLayer {
    log: MemoryLog,
}

impl MemoryLogLayer {
    pub fn new(log: MemoryLog) -> Self {
        Self { log }
    }
}

impl<S> Layer<S> for MemoryLogLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct LineVisitor(String);
        impl tracing::field::Visit for LineVisitor {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.0 = format!("{:?}", value);
                } else {
                    self.0 = format!("{} {}={:?}", self.0, field.name(), value);
                }
            }
        }
        let mut visitor = LineVisitor(String::new());
        event.record(&mut visitor);
        self.log.push(format!("[{}] {}", event.metadata().level(), visitor.0));
    }
}

/// Installs a global subscriber that filters via `RUST_LOG` and keeps a
/// rolling in-memory tail. Returns the log handle so callers (the headless
/// driver's error boundary, in particular) can read it back for a
/// user-visible report.
pub fn init(debug_logfile: Option<&std::path::Path>) -> MemoryLog {
    let log = MemoryLog::new();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = Registry::default()
        .with(filter)
        .with(MemoryLogLayer::new(log.clone()));

    if let Some(path) = debug_logfile {
        if let Ok(file) = std::fs::File::create(path) {
            let file_layer = tracing_subscriber::fmt::layer().with_writer(Mutex::new(file));
            let _ = tracing::subscriber::set_global_default(registry.with(file_layer));
            return log;
        }
    }

    let _ = tracing::subscriber::set_global_default(registry);
    log
}

//! Diagnostics forwarding.
//!
//! `HostLogLayer` is a `tracing_subscriber::Layer` that formats each event
//! into a [`LogRecord`] and appends it to a shared [`LogBuffer`]. The view
//! drains the buffer after every entry point and ships the lines over the
//! host's fire-and-forget message channel, so log traffic never goes
//! through synced state.

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;

/// Records kept before the oldest are dropped.
const BUFFER_CAPACITY: usize = 512;

/// One formatted diagnostic event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub level: String,
    pub target: String,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    /// Single-line rendering: `LEVEL target: message k=v ...`.
    pub fn format_line(&self) -> String {
        let mut line = format!("{} {}: {}", self.level, self.target, self.message);
        for (k, v) in &self.fields {
            let _ = write!(line, " {k}={v}");
        }
        line
    }
}

/// Bounded FIFO of pending records, shared between the layer and the view.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    inner: Arc<Mutex<VecDeque<LogRecord>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, record: LogRecord) {
        let mut queue = match self.inner.lock() {
            Ok(q) => q,
            Err(poisoned) => poisoned.into_inner(),
        };
        if queue.len() >= BUFFER_CAPACITY {
            queue.pop_front();
        }
        queue.push_back(record);
    }

    /// Take every pending record.
    pub fn drain(&self) -> Vec<LogRecord> {
        let mut queue = match self.inner.lock() {
            Ok(q) => q,
            Err(poisoned) => poisoned.into_inner(),
        };
        queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(q) => q.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let rendered = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(rendered);
        } else {
            self.fields.push((field.name().to_string(), rendered));
        }
    }
}

/// Layer that captures events at or above `max_level` into a [`LogBuffer`].
pub struct HostLogLayer {
    buffer: LogBuffer,
    max_level: Level,
}

impl HostLogLayer {
    pub fn new(buffer: LogBuffer, max_level: Level) -> Self {
        Self { buffer, max_level }
    }
}

impl<S> Layer<S> for HostLogLayer
where
    S: Subscriber,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        *metadata.level() <= self.max_level
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        self.buffer.push(LogRecord {
            level: metadata.level().to_string(),
            target: metadata.target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        });
    }
}

/// Build a dispatcher that feeds `buffer`.
///
/// Views scope it with `tracing::dispatcher::with_default` around each entry
/// point instead of installing a global subscriber, so several views on one
/// page keep separate logs.
pub fn dispatch(buffer: LogBuffer, max_level: Level) -> tracing::Dispatch {
    let subscriber = Registry::default().with(HostLogLayer::new(buffer, max_level));
    tracing::Dispatch::new(subscriber)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_events_are_captured() {
        let buffer = LogBuffer::new();
        let dispatch = dispatch(buffer.clone(), Level::DEBUG);
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::debug!(column = 3, "toggle sort");
            tracing::trace!("too verbose");
        });
        let records = buffer.drain();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, "DEBUG");
        assert_eq!(records[0].message, "toggle sort");
        assert_eq!(records[0].fields, vec![("column".into(), "3".into())]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_format_line() {
        let record = LogRecord {
            level: "WARN".into(),
            target: "pdview::store".into(),
            message: "discarding".into(),
            fields: vec![("error".into(), "eof".into())],
        };
        assert_eq!(record.format_line(), "WARN pdview::store: discarding error=eof");
    }

    #[test]
    fn test_buffer_is_bounded() {
        let buffer = LogBuffer::new();
        let dispatch = dispatch(buffer.clone(), Level::INFO);
        tracing::dispatcher::with_default(&dispatch, || {
            for i in 0..(BUFFER_CAPACITY + 10) {
                tracing::info!(i, "tick");
            }
        });
        let records = buffer.drain();
        assert_eq!(records.len(), BUFFER_CAPACITY);
        assert_eq!(records[0].fields[0].1, "10");
    }
}

//! Event sinks.

use std::sync::{Mutex, MutexGuard};

use crate::logging::{LogEvent, LogLevel};

/// Destination for structured log events.
pub trait EventSink: Send + Sync {
    /// Record one event.
    fn emit(&self, event: &LogEvent);
}

/// Output format for stderr logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format (for production/log aggregation).
    #[default]
    Json,
    /// Human-readable format (for development).
    Human,
}

/// Writes one line per event to stderr, which the edge platform captures.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink {
    format: LogFormat,
}

impl StderrSink {
    /// Create a stderr sink.
    pub fn new(format: LogFormat) -> Self {
        Self { format }
    }
}

impl EventSink for StderrSink {
    fn emit(&self, event: &LogEvent) {
        let output = match self.format {
            LogFormat::Json => event.to_json(),
            LogFormat::Human => event.to_human(),
        };
        eprintln!("{}", output);
    }
}

/// Forwards events to the `tracing` ecosystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &LogEvent) {
        let tag = event.tag.as_str();
        let code = event.code.as_deref().unwrap_or("");
        let alarm = event.alarm.as_deref().unwrap_or("");
        let fields_json = serde_json::to_string(&event.fields).unwrap_or_default();
        let fields = fields_json.as_str();
        let message = event.message.as_str();

        match event.level {
            LogLevel::Trace => tracing::trace!(tag, code, fields, "{}", message),
            LogLevel::Debug => tracing::debug!(tag, code, fields, "{}", message),
            LogLevel::Info => tracing::info!(tag, code, fields, "{}", message),
            LogLevel::Warn => tracing::warn!(tag, code, fields, "{}", message),
            LogLevel::Error => tracing::error!(tag, code, alarm, fields, "{}", message),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    /// Create an empty memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    /// Codes of recorded events, in emission order.
    pub fn codes(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| event.code.clone())
            .collect()
    }

    /// Check if an event with `code` was recorded.
    pub fn has_code(&self, code: &str) -> bool {
        self.lock()
            .iter()
            .any(|event| event.code.as_deref() == Some(code))
    }

    /// Events at or above `level`.
    pub fn at_least(&self, level: LogLevel) -> Vec<LogEvent> {
        self.lock()
            .iter()
            .filter(|event| event.level >= level)
            .cloned()
            .collect()
    }

    /// Drop every recorded event.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &LogEvent) {
        self.lock().push(event.clone());
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &LogEvent) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::logging::StructuredLogger;

    #[test]
    fn test_memory_sink_queries() {
        let sink = Arc::new(MemorySink::new());
        let logger = StructuredLogger::new(sink.clone()).with_min_level(LogLevel::Debug);

        logger.debug_builder("a").code("one").emit();
        logger.error_builder("b").code("two").emit();

        assert_eq!(sink.codes(), vec!["one", "two"]);
        assert!(sink.has_code("two"));
        assert!(!sink.has_code("three"));
        assert_eq!(sink.at_least(LogLevel::Warn).len(), 1);

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_null_and_tracing_sinks_accept_events() {
        let sinks: [Arc<dyn EventSink>; 2] = [Arc::new(NullSink), Arc::new(TracingSink)];
        for sink in sinks {
            let logger = StructuredLogger::new(sink).with_alarm_tag("ALARM");
            logger.error("ignored");
        }
    }
}

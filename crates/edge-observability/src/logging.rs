//! Structured logging with component tags.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::sink::EventSink;

/// Log level for structured events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A structured log event.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    /// RFC 3339 emission time.
    pub timestamp: String,
    /// Log level.
    pub level: LogLevel,
    /// Emitting component.
    pub tag: String,
    /// Stable, greppable event code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Log message.
    pub message: String,
    /// Alarm tag, set on error-level events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm: Option<String>,
    /// Additional structured fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LogEvent {
    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        let mut s = format!("[{}] {}", self.level, self.tag);

        if let Some(ref alarm) = self.alarm {
            s.push_str(&format!(" {}", alarm));
        }
        if let Some(ref code) = self.code {
            s.push_str(&format!(" {}", code));
        }
        s.push_str(&format!(": {}", self.message));

        if !self.fields.is_empty() {
            s.push_str(" | ");
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            s.push_str(&fields.join(" "));
        }

        s
    }

    /// Get a field value.
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }
}

/// Tagged logger handed to each component.
///
/// Cloning is cheap; all clones share the same sink.
#[derive(Clone)]
pub struct StructuredLogger {
    tag: String,
    alarm_tag: Option<String>,
    min_level: LogLevel,
    sink: Arc<dyn EventSink>,
}

impl fmt::Debug for StructuredLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredLogger")
            .field("tag", &self.tag)
            .field("alarm_tag", &self.alarm_tag)
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

impl StructuredLogger {
    /// Create a logger writing to a sink.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            tag: "edge".to_string(),
            alarm_tag: None,
            min_level: LogLevel::Info,
            sink,
        }
    }

    /// Set the component tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set the tag attached to error-level events.
    pub fn with_alarm_tag(mut self, alarm_tag: impl Into<String>) -> Self {
        self.alarm_tag = Some(alarm_tag.into());
        self
    }

    /// Set minimum log level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Clone this logger under another component tag.
    pub fn scoped(&self, tag: impl Into<String>) -> Self {
        self.clone().with_tag(tag)
    }

    /// Get the component tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, None, message, BTreeMap::new());
    }

    /// Log at info level.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, None, message, BTreeMap::new());
    }

    /// Log at warn level.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, None, message, BTreeMap::new());
    }

    /// Log at error level.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, None, message, BTreeMap::new());
    }

    fn log(
        &self,
        level: LogLevel,
        code: Option<String>,
        message: &str,
        fields: BTreeMap<String, serde_json::Value>,
    ) {
        if level < self.min_level {
            return;
        }

        let alarm = if level == LogLevel::Error {
            self.alarm_tag.clone()
        } else {
            None
        };

        let event = LogEvent {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level,
            tag: self.tag.clone(),
            code,
            message: message.to_string(),
            alarm,
            fields,
        };

        self.sink.emit(&event);
    }
}

/// Builder for log events with fluent API.
pub struct LogBuilder<'a> {
    logger: &'a StructuredLogger,
    level: LogLevel,
    code: Option<String>,
    message: String,
    fields: BTreeMap<String, serde_json::Value>,
}

impl<'a> LogBuilder<'a> {
    /// Create a new log builder.
    pub fn new(logger: &'a StructuredLogger, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger,
            level,
            code: None,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Set the event code.
    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add a string field.
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.to_string(), serde_json::json!(value.into()));
        self
    }

    /// Add an integer field.
    pub fn field_i64(mut self, key: &str, value: i64) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add an arbitrary JSON field.
    pub fn field_json(mut self, key: &str, value: serde_json::Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Emit the log event.
    pub fn emit(self) {
        self.logger
            .log(self.level, self.code, &self.message, self.fields);
    }
}

impl StructuredLogger {
    /// Start building a debug log event.
    pub fn debug_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Debug, message)
    }

    /// Start building an info log event.
    pub fn info_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Info, message)
    }

    /// Start building a warn log event.
    pub fn warn_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Warn, message)
    }

    /// Start building an error log event.
    pub fn error_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Error, message)
    }
}

//! Structured logging with component context.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

/// Log level for structured logs.
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

/// A structured log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Widget or service that produced the entry.
    pub component: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LogEntry {
    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        let mut s = format!("[{}] {}: {}", self.level, self.component, self.message);

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
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON format (for log aggregation).
    Json,
    /// Human-readable format (the browser console).
    #[default]
    Human,
}

/// Entries recorded by a capturing logger.
#[derive(Debug, Clone, Default)]
pub struct LogCapture(Rc<RefCell<Vec<LogEntry>>>);

impl LogCapture {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.0.borrow().clone()
    }

    /// Entries at exactly `level`.
    pub fn at(&self, level: LogLevel) -> Vec<LogEntry> {
        self.0
            .borrow()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.0
            .borrow()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }
}

#[derive(Debug, Clone)]
enum LogSink {
    Stderr,
    Capture(LogCapture),
}

/// Structured logger carrying a component name.
///
/// Cloning is cheap; clones of a capturing logger share one capture buffer.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    component: String,
    min_level: LogLevel,
    format: LogFormat,
    sink: LogSink,
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new("theme")
    }
}

impl StructuredLogger {
    /// Create a logger writing to stderr.
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            min_level: LogLevel::Info,
            format: LogFormat::Human,
            sink: LogSink::Stderr,
        }
    }

    /// Create a logger that records entries instead of printing them.
    pub fn capturing(component: impl Into<String>) -> (Self, LogCapture) {
        let capture = LogCapture::default();
        let logger = Self {
            component: component.into(),
            min_level: LogLevel::Trace,
            format: LogFormat::Human,
            sink: LogSink::Capture(capture.clone()),
        };
        (logger, capture)
    }

    /// Same sink and settings, different component.
    pub fn child(&self, component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            ..self.clone()
        }
    }

    /// Set minimum log level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, BTreeMap::new());
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, BTreeMap::new());
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message, BTreeMap::new());
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, BTreeMap::new());
    }

    fn log(&self, level: LogLevel, message: &str, fields: BTreeMap<String, serde_json::Value>) {
        if level < self.min_level {
            return;
        }

        let entry = LogEntry {
            level,
            message: message.to_string(),
            component: self.component.clone(),
            fields,
        };

        match &self.sink {
            LogSink::Stderr => {
                let output = match self.format {
                    LogFormat::Json => entry.to_json(),
                    LogFormat::Human => entry.to_human(),
                };
                eprintln!("{}", output);
            }
            LogSink::Capture(capture) => capture.0.borrow_mut().push(entry),
        }
    }
}

/// Builder for log entries with fluent API.
pub struct LogBuilder<'a> {
    logger: &'a StructuredLogger,
    level: LogLevel,
    message: String,
    fields: BTreeMap<String, serde_json::Value>,
}

impl<'a> LogBuilder<'a> {
    pub fn new(logger: &'a StructuredLogger, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger,
            level,
            message: message.into(),
            fields: BTreeMap::new(),
        }
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

    /// Add a float field.
    pub fn field_f64(mut self, key: &str, value: f64) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add a boolean field.
    pub fn field_bool(mut self, key: &str, value: bool) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Emit the log entry.
    pub fn emit(self) {
        self.logger.log(self.level, &self.message, self.fields);
    }
}

impl StructuredLogger {
    pub fn info_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Info, message)
    }

    pub fn warn_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Warn, message)
    }

    pub fn error_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Error, message)
    }

    pub fn debug_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Debug, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_and_child_share_buffer() {
        let (logger, capture) = StructuredLogger::capturing("theme");
        let wishlist = logger.child("wishlist");

        logger.info("booted");
        wishlist
            .error_builder("Error saving wishlist")
            .field("key", "ogag:wishlist")
            .emit();

        let entries = capture.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].component, "wishlist");
        assert_eq!(entries[1].fields["key"], serde_json::json!("ogag:wishlist"));
        assert!(capture.contains(LogLevel::Error, "saving"));
    }

    #[test]
    fn test_min_level_filters() {
        let (logger, capture) = StructuredLogger::capturing("theme");
        let logger = logger.with_min_level(LogLevel::Warn);
        logger.info("ignored");
        logger.warn("kept");
        assert_eq!(capture.entries().len(), 1);
    }

    #[test]
    fn test_formats() {
        let entry = LogEntry {
            level: LogLevel::Warn,
            message: "Failed to load lazy image".to_string(),
            component: "lazyload".to_string(),
            fields: BTreeMap::from([("src".to_string(), serde_json::json!("/a.jpg"))]),
        };
        assert_eq!(
            entry.to_human(),
            r#"[WARN] lazyload: Failed to load lazy image | src="/a.jpg""#
        );
        let json: serde_json::Value = serde_json::from_str(&entry.to_json()).unwrap();
        assert_eq!(json["level"], "warn");
        assert_eq!(json["src"], "/a.jpg");
    }
}

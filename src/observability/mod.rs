//! Structured logging for the client.
//!
//! [`Logger`] is a capability contract so that host applications can plug
//! in whatever logging stack they run. [`TracingLogger`] bridges to the
//! `tracing` ecosystem and is what most users want; the client logs nothing
//! unless a logger is configured.

use std::fmt::Write as _;

/// Structured logging capability with four severity levels.
///
/// Each method takes a message plus structured key-value pairs.
pub trait Logger: Send + Sync {
    /// Log at debug severity.
    fn debug(&self, message: &str, fields: &[(&str, &str)]);
    /// Log at info severity.
    fn info(&self, message: &str, fields: &[(&str, &str)]);
    /// Log at warn severity.
    fn warn(&self, message: &str, fields: &[(&str, &str)]);
    /// Log at error severity.
    fn error(&self, message: &str, fields: &[(&str, &str)]);
}

fn render_fields(fields: &[(&str, &str)]) -> String {
    let mut rendered = String::new();
    for (key, value) in fields {
        let _ = write!(rendered, " {key}={value}");
    }
    rendered
}

/// [`Logger`] implementation forwarding to the `tracing` crate under the
/// `plantbook` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// Creates a new tracing-backed logger.
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str, fields: &[(&str, &str)]) {
        tracing::debug!(target: "plantbook", "{}{}", message, render_fields(fields));
    }

    fn info(&self, message: &str, fields: &[(&str, &str)]) {
        tracing::info!(target: "plantbook", "{}{}", message, render_fields(fields));
    }

    fn warn(&self, message: &str, fields: &[(&str, &str)]) {
        tracing::warn!(target: "plantbook", "{}{}", message, render_fields(fields));
    }

    fn error(&self, message: &str, fields: &[(&str, &str)]) {
        tracing::error!(target: "plantbook", "{}{}", message, render_fields(fields));
    }
}

/// [`Logger`] implementation that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl NoopLogger {
    /// Creates a new no-op logger.
    pub fn new() -> Self {
        Self
    }
}

impl Logger for NoopLogger {
    fn debug(&self, _message: &str, _fields: &[(&str, &str)]) {}
    fn info(&self, _message: &str, _fields: &[(&str, &str)]) {}
    fn warn(&self, _message: &str, _fields: &[(&str, &str)]) {}
    fn error(&self, _message: &str, _fields: &[(&str, &str)]) {}
}

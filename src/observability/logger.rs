//! Structured JSON logger
//!
//! - One log line = one event
//! - Deterministic key ordering (event, severity, then fields sorted)
//! - Synchronous, no buffering
//!
//! Operator-facing configuration faults and per-request outcomes go through
//! this logger; validation errors themselves are returned to callers as
//! data, never logged on their behalf.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Normal operations
    Info,
    /// Recoverable issues (e.g. a degraded lookup dependency)
    Warn,
    /// Operation failures
    Error,
    /// Unusable configuration, the load step failed
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Event names used across the crate
pub const EVENT_STORE_LOADED: &str = "FORM_STORE_LOADED";
pub const EVENT_STORE_LOAD_FAILED: &str = "FORM_STORE_LOAD_FAILED";
pub const EVENT_FORM_NOT_FOUND: &str = "FORM_NOT_FOUND";
pub const EVENT_PAYLOAD_ACCEPTED: &str = "FORM_PAYLOAD_ACCEPTED";
pub const EVENT_PAYLOAD_REJECTED: &str = "FORM_PAYLOAD_REJECTED";

/// Emit an INFO event
pub fn info(event: &str, fields: &[(&str, &str)]) {
    write_line(&mut io::stdout(), LogLevel::Info, event, fields);
}

/// Emit a WARN event
pub fn warn(event: &str, fields: &[(&str, &str)]) {
    write_line(&mut io::stdout(), LogLevel::Warn, event, fields);
}

/// Emit an ERROR event
pub fn error(event: &str, fields: &[(&str, &str)]) {
    write_line(&mut io::stderr(), LogLevel::Error, event, fields);
}

/// Emit a FATAL event
pub fn fatal(event: &str, fields: &[(&str, &str)]) {
    write_line(&mut io::stderr(), LogLevel::Fatal, event, fields);
}

fn write_line<W: Write>(writer: &mut W, level: LogLevel, event: &str, fields: &[(&str, &str)]) {
    let line = render(level, event, fields);
    // One write, one flush: a log line is never interleaved.
    let _ = writer.write_all(line.as_bytes());
    let _ = writer.flush();
}

/// Renders one event as a single JSON line
fn render(level: LogLevel, event: &str, fields: &[(&str, &str)]) -> String {
    let sorted: BTreeMap<&str, &str> = fields.iter().copied().collect();

    let mut line = String::with_capacity(128);
    line.push_str("{\"event\":\"");
    escape_into(&mut line, event);
    line.push_str("\",\"severity\":\"");
    line.push_str(level.as_str());
    line.push('"');

    for (key, value) in sorted {
        line.push_str(",\"");
        escape_into(&mut line, key);
        line.push_str("\":\"");
        escape_into(&mut line, value);
        line.push('"');
    }

    line.push_str("}\n");
    line
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
}

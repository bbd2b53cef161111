//! Structured JSON-lines logger.
//!
//! - One log line = one event, written synchronously
//! - Deterministic key order: ts, event, severity, then fields sorted
//!   alphabetically
//! - INFO to stdout; WARN and ERROR to stderr

use std::fmt;
use std::io::{self, Write};

use chrono::{SecondsFormat, Utc};

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log an INFO event with the given fields.
pub fn log_event(event: &str, fields: &[(&str, &str)]) {
    emit(Severity::Info, event, fields, &mut io::stdout());
}

/// Log a WARN event with the given fields.
pub fn log_warn(event: &str, fields: &[(&str, &str)]) {
    emit(Severity::Warn, event, fields, &mut io::stderr());
}

/// Log an ERROR event with the given fields.
pub fn log_error(event: &str, fields: &[(&str, &str)]) {
    emit(Severity::Error, event, fields, &mut io::stderr());
}

fn emit<W: Write>(severity: Severity, event: &str, fields: &[(&str, &str)], writer: &mut W) {
    let mut line = String::with_capacity(192);

    line.push_str("{\"ts\":\"");
    line.push_str(&Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    line.push_str("\",\"event\":\"");
    escape_into(&mut line, event);
    line.push_str("\",\"severity\":\"");
    line.push_str(severity.as_str());
    line.push('"');

    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);
    for (key, value) in sorted {
        line.push_str(",\"");
        escape_into(&mut line, key);
        line.push_str("\":\"");
        escape_into(&mut line, value);
        line.push('"');
    }

    line.push_str("}\n");

    // One write_all call per line so concurrent events never interleave.
    let _ = writer.write_all(line.as_bytes());
    let _ = writer.flush();
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

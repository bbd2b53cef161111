//! # Observability
//!
//! Structured JSON-lines event logging. One log line = one event.

mod logger;

pub use logger::{log_event, log_warn, log_error, Severity};

//! Structured logging for gifsmith.
//!
//! Console plus daily rotated JSON log files, URL/token redaction, and the
//! pipeline event log.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{signature_hex, EventLogEntry, EventLogger, PipelineEvent};
pub use logger::init_logger;
pub use redact::{redact_sensitive_data, redact_url};

//! Pipeline Event Logger
//!
//! One structured record per notable pipeline step, emitted through `tracing`
//! under the `pipeline_events` target so it lands in the rotated log files.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::redact::{redact_sensitive_data, redact_url};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Fetched {
        url: String,
        content_type: Option<String>,
        bytes: usize,
        /// Leading payload bytes, hex encoded.
        signature: String,
        kind: String,
    },
    Converted {
        operation: String,
        frames: usize,
        bytes: usize,
        elapsed_ms: u128,
    },
    Disabled {
        operation: String,
        url: String,
    },
    Failed {
        operation: String,
        url: String,
        content_type: Option<String>,
        signature: Option<String>,
        error_kind: String,
        error: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: PipelineEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts and emits one event. `Failed` is logged at error level, everything else at info.
    pub fn log_event(request_id: &str, mut event: PipelineEvent) {
        match &mut event {
            PipelineEvent::Fetched { url, .. } | PipelineEvent::Disabled { url, .. } => {
                *url = redact_url(url);
            }
            PipelineEvent::Failed { url, error, .. } => {
                *url = redact_url(url);
                *error = redact_sensitive_data(error);
            }
            PipelineEvent::Converted { .. } => {}
        }

        let failed = matches!(event, PipelineEvent::Failed { .. });
        let entry = EventLogEntry {
            request_id: request_id.into(),
            timestamp: Utc::now(),
            event,
        };
        let json = serde_json::to_string(&entry).unwrap_or_default();

        if failed {
            error!(target: "pipeline_events", request_id, event = %json, "Pipeline request failed");
        } else {
            info!(target: "pipeline_events", request_id, event = %json, "Pipeline event");
        }
    }
}

/// Hex-encode up to the first 16 bytes of a payload for log context.
pub fn signature_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(16)
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_event_serializes_with_tag() {
        let entry = EventLogEntry {
            request_id: "r1".into(),
            timestamp: Utc::now(),
            event: PipelineEvent::Failed {
                operation: "caption_gif".into(),
                url: "https://x/y.gif".into(),
                content_type: Some("text/html".into()),
                signature: Some(signature_hex(b"<html>")),
                error_kind: "decode".into(),
                error: "decode failed: unexpected end of file".into(),
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "failed");
        assert_eq!(json["event"]["error_kind"], "decode");
        assert_eq!(json["event"]["error"], "decode failed: unexpected end of file");
        assert!(json["event"].get("backtrace").is_none());
    }

    #[test]
    fn signature_is_truncated_hex() {
        let sig = signature_hex(b"\x00\x00\x00\x18ftypmp42-and-more-bytes");
        assert!(sig.starts_with("00 00 00 18 66 74 79 70"));
        assert_eq!(sig.split(' ').count(), 16);
    }
}

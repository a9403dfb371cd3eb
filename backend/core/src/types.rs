use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Text surfaced to the user when video conversion is switched off.
pub const VIDEO_DISABLED_MESSAGE: &str =
    "Video to GIF conversion is currently disabled. Try an image instead!";

/// What a downloaded payload was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Result handed back to the command dispatcher.
///
/// The pipeline never returns an error to its caller; failures have already
/// been logged by the time `Failed` is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Encoded GIF bytes.
    Gif(Bytes),
    /// Deliberate short-circuit; the message must be shown to the user verbatim.
    Disabled(String),
    /// The request failed.
    Failed,
}

impl PipelineOutcome {
    pub fn is_gif(&self) -> bool {
        matches!(self, PipelineOutcome::Gif(_))
    }

    pub fn into_gif(self) -> Option<Bytes> {
        match self {
            PipelineOutcome::Gif(bytes) => Some(bytes),
            _ => None,
        }
    }
}

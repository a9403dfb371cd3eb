use std::time::Duration;

use thiserror::Error;

/// Failure kinds produced by the media pipeline.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("fetch failed for {url}: {reason}")]
    Fetch {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("could not decode media: {0}")]
    Decode(String),

    #[error("could not encode gif: {0}")]
    Encode(String),

    #[error("video conversion exceeded the {0:?} deadline")]
    Timeout(Duration),

    #[error("captioning failed")]
    Composite(#[source] Box<MediaError>),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Short stable label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            MediaError::Fetch { .. } => "fetch",
            MediaError::Decode(_) => "decode",
            MediaError::Encode(_) => "encode",
            MediaError::Timeout(_) => "timeout",
            MediaError::Composite(_) => "composite",
            MediaError::Io(_) => "io",
        }
    }

    /// Wrap the error as a captioning failure. Already-wrapped errors are returned unchanged.
    pub fn into_composite(self) -> MediaError {
        match self {
            MediaError::Composite(_) => self,
            other => MediaError::Composite(Box::new(other)),
        }
    }

    /// The innermost error, looking through `Composite` wrappers.
    pub fn root(&self) -> &MediaError {
        match self {
            MediaError::Composite(inner) => inner.root(),
            other => other,
        }
    }
}

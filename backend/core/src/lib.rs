pub mod error;
pub mod types;

pub use error::MediaError;
pub use types::{MediaKind, PipelineOutcome, VIDEO_DISABLED_MESSAGE};

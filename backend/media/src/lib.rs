//! Media pipeline: download remote media and turn it into animated GIFs.
//!
//! Three entry points live on [`MediaPipeline`]: convert any image or video,
//! convert a still image, and caption an existing GIF.

pub mod caption;
pub mod config;
pub mod fetch;
pub mod gif_encode;
pub mod image;
pub mod mime_detect;
pub mod pipeline;
pub mod pool;
pub mod video;

#[cfg(test)]
pub(crate) mod test_support;

pub use caption::{caption_frames, CaptionFont, CaptionLayout, CaptionStyle};
pub use config::MediaConfig;
pub use fetch::{FetchedMedia, Fetcher};
pub use gif_encode::{decode_frames, encode_animation, GifFrame};
pub use self::image::convert_image;
pub use mime_detect::{classify, is_image, is_video};
pub use pipeline::MediaPipeline;
pub use pool::DecodePool;
pub use video::{FfmpegCliDecoder, SamplePlan, VideoConverter, VideoDecoder};

pub use gifsmith_core::{MediaError, MediaKind, PipelineOutcome, VIDEO_DISABLED_MESSAGE};

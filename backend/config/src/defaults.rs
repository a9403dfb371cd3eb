//! Config defaults: applies sensible default values to parsed config.

use crate::schema::{GifsmithConfig, LoggingConfig, MediaSettings};

/// Default HTTP fetch timeout (seconds).
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default ceiling on the video decode step (seconds).
pub const DEFAULT_VIDEO_DEADLINE_SECS: u64 = 60;

/// Default number of concurrent video decode workers.
pub const DEFAULT_WORKER_POOL_SIZE: usize = 2;

/// Default video frame subsampling step.
pub const DEFAULT_FRAME_STEP: u32 = 4;

/// Frames taller than this are scaled down to it.
pub const DEFAULT_MAX_VIDEO_HEIGHT: u32 = 480;

/// Default output frame rate for converted videos.
pub const DEFAULT_VIDEO_FPS: u32 = 8;

/// Default caption font size (px).
pub const DEFAULT_FONT_SIZE: f32 = 60.0;

/// Default outer caption padding (px).
pub const DEFAULT_CAPTION_PADDING: u32 = 20;

/// Default padding between caption lines (px).
pub const DEFAULT_LINE_PADDING: u32 = 10;

pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: GifsmithConfig) -> GifsmithConfig {
    let config = apply_media_defaults(config);
    apply_logging_defaults(config)
}

/// Fill every unset media pipeline knob.
fn apply_media_defaults(mut config: GifsmithConfig) -> GifsmithConfig {
    let media = config.media.get_or_insert_with(MediaSettings::default);
    media.video_enabled.get_or_insert(true);
    media.fetch_timeout_secs.get_or_insert(DEFAULT_FETCH_TIMEOUT_SECS);
    media.video_deadline_secs.get_or_insert(DEFAULT_VIDEO_DEADLINE_SECS);
    media.worker_pool_size.get_or_insert(DEFAULT_WORKER_POOL_SIZE);
    media.frame_step.get_or_insert(DEFAULT_FRAME_STEP);
    media.max_video_height.get_or_insert(DEFAULT_MAX_VIDEO_HEIGHT);
    media.video_fps.get_or_insert(DEFAULT_VIDEO_FPS);
    media.font_size.get_or_insert(DEFAULT_FONT_SIZE);
    media.caption_padding.get_or_insert(DEFAULT_CAPTION_PADDING);
    media.line_padding.get_or_insert(DEFAULT_LINE_PADDING);
    config
}

fn apply_logging_defaults(mut config: GifsmithConfig) -> GifsmithConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.dir.is_none() {
        logging.dir = Some(DEFAULT_LOG_DIR.to_string());
    }
    config
}

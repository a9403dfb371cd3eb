use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use gifsmith_config::defaults::*;
use gifsmith_config::GifsmithConfig;
use gifsmith_media::MediaConfig;

/// Settings the binary needs, resolved from the loaded config.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub media: MediaConfig,
    pub token: Option<String>,
    pub guild_id: Option<u64>,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl RuntimeConfig {
    pub fn from_config(config: &GifsmithConfig) -> Self {
        let media = config.media.clone().unwrap_or_default();
        let logging = config.logging.clone().unwrap_or_default();
        let discord = config.discord.clone().unwrap_or_default();

        Self {
            media: MediaConfig {
                video_enabled: media.video_enabled.unwrap_or(true),
                fetch_timeout: Duration::from_secs(
                    media.fetch_timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
                ),
                video_deadline: Duration::from_secs(
                    media.video_deadline_secs.unwrap_or(DEFAULT_VIDEO_DEADLINE_SECS),
                ),
                worker_pool_size: media.worker_pool_size.unwrap_or(DEFAULT_WORKER_POOL_SIZE),
                frame_step: media.frame_step.unwrap_or(DEFAULT_FRAME_STEP),
                max_video_height: media.max_video_height.unwrap_or(DEFAULT_MAX_VIDEO_HEIGHT),
                video_fps: media.video_fps.unwrap_or(DEFAULT_VIDEO_FPS),
                font_path: media.font_path.map(PathBuf::from),
                font_size: media.font_size.unwrap_or(DEFAULT_FONT_SIZE),
                caption_padding: media.caption_padding.unwrap_or(DEFAULT_CAPTION_PADDING),
                line_padding: media.line_padding.unwrap_or(DEFAULT_LINE_PADDING),
                temp_dir: media.temp_dir.map(PathBuf::from),
                ffmpeg_dir: media.ffmpeg_dir.map(PathBuf::from),
            },
            token: discord.token.filter(|t| !t.trim().is_empty()),
            guild_id: discord.guild_id,
            log_level: logging.level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: PathBuf::from(logging.dir.unwrap_or_else(|| DEFAULT_LOG_DIR.to_string())),
        }
    }

    /// The configured token, or `DISCORD_TOKEN` from the environment.
    pub fn discord_token(&self) -> Result<String> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }
        std::env::var("DISCORD_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .context("No Discord token: set discord.token in the config or DISCORD_TOKEN")
    }
}

//! gifsmith configuration schema.
//!
//! Every field is optional so that a partial YAML file deserializes cleanly;
//! `defaults::apply_all_defaults` fills in the rest.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for gifsmith.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GifsmithConfig {
    /// Discord connection settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<DiscordConfig>,

    /// Media pipeline tuning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaSettings>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Discord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscordConfig {
    /// Bot token. Usually `${DISCORD_TOKEN}`; when unset the binary reads
    /// `DISCORD_TOKEN` from the environment at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Register slash commands to this guild only (instant propagation while
    /// developing) instead of globally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<u64>,
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSettings {
    /// Whether video → GIF conversion runs at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_secs: Option<u64>,

    /// Overall ceiling on the video decode step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_deadline_secs: Option<u64>,

    /// Number of concurrent video decode workers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_pool_size: Option<usize>,

    /// Keep every Nth decoded video frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_step: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_video_height: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_fps: Option<u32>,

    /// Caption font override (TTF/OTF). The bundled DejaVu Sans is used when
    /// unset or when the file cannot be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_path: Option<String>,

    /// Caption font size in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,

    /// Space above the first and below the last caption line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_padding: Option<u32>,

    /// Space between caption lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_padding: Option<u32>,

    /// Directory for temporary video files (defaults to the OS temp dir).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<String>,

    /// Directory containing `ffmpeg`/`ffprobe` (defaults to `PATH` lookup).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Directory for daily rotated log files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

//! Request-level entry points.
//!
//! Each call is independent: fetch, classify, convert, and report. The
//! `PipelineOutcome` methods never return an error; failures are logged once
//! through the event log and collapsed to `PipelineOutcome::Failed`.

use std::error::Error as _;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use bytes::Bytes;
use gifsmith_core::{MediaError, MediaKind, PipelineOutcome, VIDEO_DISABLED_MESSAGE};
use gifsmith_logging::{signature_hex, EventLogger, PipelineEvent};
use tracing::{info, warn};
use uuid::Uuid;

use crate::caption::{caption_frames, CaptionFont, CaptionStyle};
use crate::config::MediaConfig;
use crate::fetch::{FetchedMedia, Fetcher};
use crate::image::convert_image;
use crate::mime_detect::{classify, url_has_video_extension};
use crate::pool::DecodePool;
use crate::video::{VideoConverter, VideoDecoder};

/// Per-request context carried into the event log.
struct RequestContext {
    id: String,
    operation: &'static str,
    url: String,
    content_type: Option<String>,
    signature: Option<String>,
    started: Instant,
}

impl RequestContext {
    fn new(operation: &'static str, url: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            operation,
            url: url.to_string(),
            content_type: None,
            signature: None,
            started: Instant::now(),
        }
    }

    fn record_fetch(&mut self, media: &FetchedMedia, kind: MediaKind) {
        let signature = signature_hex(&media.bytes);
        self.content_type = media.content_type.clone();
        self.signature = Some(signature.clone());
        EventLogger::log_event(
            &self.id,
            PipelineEvent::Fetched {
                url: self.url.clone(),
                content_type: media.content_type.clone(),
                bytes: media.bytes.len(),
                signature,
                kind: kind.as_str().into(),
            },
        );
    }

    fn record_converted(&self, frames: usize, gif: &Bytes) {
        EventLogger::log_event(
            &self.id,
            PipelineEvent::Converted {
                operation: self.operation.into(),
                frames,
                bytes: gif.len(),
                elapsed_ms: self.started.elapsed().as_millis(),
            },
        );
    }

    fn record_disabled(&self) {
        EventLogger::log_event(
            &self.id,
            PipelineEvent::Disabled {
                operation: self.operation.into(),
                url: self.url.clone(),
            },
        );
    }

    fn record_failure(self, err: &MediaError) {
        EventLogger::log_event(
            &self.id,
            PipelineEvent::Failed {
                operation: self.operation.into(),
                url: self.url,
                content_type: self.content_type,
                signature: self.signature,
                error_kind: err.root().kind().into(),
                error: error_chain(err),
            },
        );
    }
}

/// `outer: inner: innermost`
fn error_chain(err: &MediaError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

pub struct MediaPipeline {
    config: MediaConfig,
    fetcher: Fetcher,
    video: VideoConverter,
    font: Arc<CaptionFont>,
    style: CaptionStyle,
}

impl MediaPipeline {
    /// Build a pipeline with the default video decoder for this build.
    pub fn new(config: MediaConfig) -> anyhow::Result<Self> {
        let decoder = default_decoder(&config)?;
        Self::with_decoder(config, decoder)
    }

    pub fn with_decoder(config: MediaConfig, decoder: Arc<dyn VideoDecoder>) -> anyhow::Result<Self> {
        let fetcher = Fetcher::new(config.fetch_timeout).context("Failed to build HTTP client")?;
        let pool = DecodePool::new(config.worker_pool_size);
        let video = VideoConverter::new(&config, decoder, pool);
        let font = Arc::new(CaptionFont::resolve(config.font_path.as_deref(), config.font_size));
        let style = CaptionStyle {
            padding: config.caption_padding,
            line_padding: config.line_padding,
        };

        info!(
            video_enabled = config.video_enabled,
            workers = config.worker_pool_size,
            builtin_font = font.is_builtin(),
            "Media pipeline ready"
        );
        Ok(Self {
            config,
            fetcher,
            video,
            font,
            style,
        })
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Convert an image or video URL to a GIF.
    pub async fn to_gif(&self, url: &str) -> PipelineOutcome {
        let mut ctx = RequestContext::new("to_gif", url);
        let result = self.run_to_gif(&mut ctx).await;
        Self::settle(ctx, result)
    }

    /// Convert a still image URL to a one-frame GIF.
    pub async fn image_to_gif(&self, url: &str) -> PipelineOutcome {
        let mut ctx = RequestContext::new("image_to_gif", url);
        let result = self.run_image_to_gif(&mut ctx).await.map(PipelineOutcome::Gif);
        Self::settle(ctx, result)
    }

    /// Add `caption` in a white band above every frame of the GIF at `url`.
    pub async fn caption_gif(&self, url: &str, caption: &str) -> PipelineOutcome {
        let mut ctx = RequestContext::new("caption_gif", url);
        let result = self
            .run_caption_gif(&mut ctx, caption)
            .await
            .map(PipelineOutcome::Gif);
        Self::settle(ctx, result)
    }

    /// Like [`Self::to_gif`] but hands the error back instead of logging it.
    /// Never returns `PipelineOutcome::Failed`.
    pub async fn try_to_gif(&self, url: &str) -> Result<PipelineOutcome, MediaError> {
        self.run_to_gif(&mut RequestContext::new("to_gif", url)).await
    }

    pub async fn try_image_to_gif(&self, url: &str) -> Result<Bytes, MediaError> {
        self.run_image_to_gif(&mut RequestContext::new("image_to_gif", url))
            .await
    }

    pub async fn try_caption_gif(&self, url: &str, caption: &str) -> Result<Bytes, MediaError> {
        self.run_caption_gif(&mut RequestContext::new("caption_gif", url), caption)
            .await
    }

    fn settle(ctx: RequestContext, result: Result<PipelineOutcome, MediaError>) -> PipelineOutcome {
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                ctx.record_failure(&err);
                PipelineOutcome::Failed
            }
        }
    }

    fn disabled(&self, ctx: &RequestContext) -> PipelineOutcome {
        ctx.record_disabled();
        PipelineOutcome::Disabled(VIDEO_DISABLED_MESSAGE.to_string())
    }

    async fn run_to_gif(&self, ctx: &mut RequestContext) -> Result<PipelineOutcome, MediaError> {
        if !self.config.video_enabled && url_has_video_extension(&ctx.url) {
            return Ok(self.disabled(ctx));
        }

        let media = self.fetcher.fetch(&ctx.url).await?;
        let kind = classify(&media.url, media.content_type.as_deref(), &media.bytes);
        ctx.record_fetch(&media, kind);

        match kind {
            MediaKind::Video if !self.config.video_enabled => Ok(self.disabled(ctx)),
            MediaKind::Video => {
                let converted = self.video.convert(&media.url, &media.bytes).await?;
                ctx.record_converted(converted.frames, &converted.gif);
                Ok(PipelineOutcome::Gif(converted.gif))
            }
            MediaKind::Image => {
                let gif = convert_image(&media.bytes)?;
                ctx.record_converted(1, &gif);
                Ok(PipelineOutcome::Gif(gif))
            }
        }
    }

    async fn run_image_to_gif(&self, ctx: &mut RequestContext) -> Result<Bytes, MediaError> {
        let media = self.fetcher.fetch(&ctx.url).await?;
        ctx.record_fetch(&media, MediaKind::Image);
        let gif = convert_image(&media.bytes)?;
        ctx.record_converted(1, &gif);
        Ok(gif)
    }

    async fn run_caption_gif(
        &self,
        ctx: &mut RequestContext,
        caption: &str,
    ) -> Result<Bytes, MediaError> {
        let media = self
            .fetcher
            .fetch(&ctx.url)
            .await
            .map_err(MediaError::into_composite)?;
        let kind = classify(&media.url, media.content_type.as_deref(), &media.bytes);
        ctx.record_fetch(&media, kind);
        if kind == MediaKind::Video {
            warn!(request_id = %ctx.id, "Caption source looks like a video; decoding as image");
        }

        let captioned = caption_frames(&media.bytes, caption, &self.font, self.style)?;
        ctx.record_converted(captioned.frames, &captioned.gif);
        Ok(captioned.gif)
    }
}

#[cfg(not(feature = "ffmpeg-native"))]
fn default_decoder(config: &MediaConfig) -> anyhow::Result<Arc<dyn VideoDecoder>> {
    let decoder = crate::video::FfmpegCliDecoder::locate(config.ffmpeg_dir.as_deref());
    if config.video_enabled && !decoder.is_available() {
        warn!("ffmpeg/ffprobe not found; video conversion will fail until they are installed");
    }
    Ok(Arc::new(decoder))
}

#[cfg(feature = "ffmpeg-native")]
fn default_decoder(_config: &MediaConfig) -> anyhow::Result<Arc<dyn VideoDecoder>> {
    let decoder = crate::video::NativeDecoder::new().context("Failed to initialise ffmpeg")?;
    Ok(Arc::new(decoder))
}

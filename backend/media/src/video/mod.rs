//! Video → animated GIF.
//!
//! The payload is spilled to a temp file, decoded on a [`DecodePool`] worker
//! under a deadline, sampled, and encoded at a fixed frame rate.

pub mod decoder;
#[cfg(feature = "ffmpeg-native")]
pub mod native;

pub use decoder::{FfmpegCliDecoder, SamplePlan, VideoDecoder};
#[cfg(feature = "ffmpeg-native")]
pub use native::NativeDecoder;

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use gifsmith_core::MediaError;
use tempfile::{Builder, TempPath};
use tracing::{debug, warn};

use crate::config::MediaConfig;
use crate::gif_encode::{encode_animation, frame_delays, GifFrame};
use crate::mime_detect::video_extension;
use crate::pool::DecodePool;

const DEFAULT_SUFFIX: &str = ".mp4";

/// Result of one video conversion.
#[derive(Debug, Clone)]
pub struct ConvertedVideo {
    pub gif: Bytes,
    pub frames: usize,
}

#[derive(Clone)]
pub struct VideoConverter {
    decoder: Arc<dyn VideoDecoder>,
    pool: DecodePool,
    plan: SamplePlan,
    fps: u32,
    deadline: Duration,
    temp_dir: Option<PathBuf>,
}

impl VideoConverter {
    pub fn new(config: &MediaConfig, decoder: Arc<dyn VideoDecoder>, pool: DecodePool) -> Self {
        Self {
            decoder,
            pool,
            plan: SamplePlan {
                step: config.frame_step.max(1),
                max_height: config.max_video_height,
            },
            fps: config.video_fps,
            deadline: config.video_deadline,
            temp_dir: config.temp_dir.clone(),
        }
    }

    pub fn pool(&self) -> &DecodePool {
        &self.pool
    }

    /// Convert `bytes` fetched from `url`. The URL only picks the temp file suffix.
    pub async fn convert(&self, url: &str, bytes: &[u8]) -> Result<ConvertedVideo, MediaError> {
        let temp = self.spill(url, bytes)?;
        let result = self.decode_with_deadline(temp.to_path_buf()).await;

        let path = temp.to_path_buf();
        if let Err(e) = temp.close() {
            warn!(path = %path.display(), error = %e, "Failed to remove temp video");
        }

        let images = result?;
        let delays = frame_delays(self.fps, images.len());
        let frames: Vec<GifFrame> = images
            .into_iter()
            .zip(delays)
            .map(|(image, delay)| GifFrame { image, delay })
            .collect();
        let count = frames.len();
        let gif = encode_animation(frames)?;
        Ok(ConvertedVideo { gif, frames: count })
    }

    /// Write the payload to a named temp file whose suffix matches the source.
    fn spill(&self, url: &str, bytes: &[u8]) -> Result<TempPath, MediaError> {
        let suffix = video_extension(url).unwrap_or(DEFAULT_SUFFIX);
        let mut builder = Builder::new();
        builder.prefix("gifsmith-").suffix(suffix);

        let mut file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(bytes)?;
        file.flush()?;
        debug!(path = %file.path().display(), bytes = bytes.len(), "Spilled video to temp file");
        Ok(file.into_temp_path())
    }

    async fn decode_with_deadline(
        &self,
        path: PathBuf,
    ) -> Result<Vec<image::RgbaImage>, MediaError> {
        let cancel = Arc::new(AtomicBool::new(false));
        let job = {
            let decoder = self.decoder.clone();
            let plan = self.plan;
            let cancel = cancel.clone();
            move || decoder.decode(&path, &plan, &cancel)
        };

        match tokio::time::timeout(self.deadline, self.pool.run(job)).await {
            Ok(result) => result,
            Err(_) => {
                cancel.store(true, Ordering::Relaxed);
                Err(MediaError::Timeout(self.deadline))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gif_encode::decode_frames;
    use image::{Rgba, RgbaImage};
    use std::path::Path;
    use std::sync::Mutex;

    /// Produces `count` solid frames, honouring the plan like a real decoder.
    struct SyntheticDecoder {
        count: u64,
        size: (u32, u32),
        delay: Duration,
        seen: Mutex<Vec<PathBuf>>,
    }

    impl SyntheticDecoder {
        fn new(count: u64, size: (u32, u32)) -> Self {
            Self {
                count,
                size,
                delay: Duration::ZERO,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl VideoDecoder for SyntheticDecoder {
        fn decode(
            &self,
            path: &Path,
            plan: &SamplePlan,
            cancel: &AtomicBool,
        ) -> Result<Vec<RgbaImage>, MediaError> {
            assert!(path.is_file());
            self.seen.lock().unwrap().push(path.to_path_buf());
            let (w, h) = plan.target_size(self.size.0, self.size.1);
            let mut frames = Vec::new();
            for i in 0..self.count {
                if cancel.load(Ordering::Relaxed) {
                    return Err(MediaError::Decode("decode cancelled".into()));
                }
                std::thread::sleep(self.delay);
                if plan.keeps(i) {
                    frames.push(RgbaImage::from_pixel(w, h, Rgba([(i * 10) as u8, 0, 0, 255])));
                }
            }
            Ok(frames)
        }
    }

    struct FailingDecoder;

    impl VideoDecoder for FailingDecoder {
        fn decode(&self, _: &Path, _: &SamplePlan, _: &AtomicBool) -> Result<Vec<RgbaImage>, MediaError> {
            Err(MediaError::Decode("moov atom not found".into()))
        }
    }

    fn converter(decoder: Arc<dyn VideoDecoder>, temp: &Path, deadline: Duration) -> VideoConverter {
        let config = MediaConfig {
            temp_dir: Some(temp.to_path_buf()),
            video_deadline: deadline,
            ..MediaConfig::default()
        };
        VideoConverter::new(&config, decoder, DecodePool::new(config.worker_pool_size))
    }

    fn is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn samples_scales_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = Arc::new(SyntheticDecoder::new(10, (1280, 720)));
        let conv = converter(decoder.clone(), dir.path(), Duration::from_secs(5));

        let out = conv.convert("https://cdn.example/clip.webm?ex=1", b"fake video").await.unwrap();
        assert_eq!(out.frames, 3);

        let frames = decode_frames(&out.gif).unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].image.dimensions(), (853, 480));
        let delays: Vec<u128> = frames.iter().map(|f| f.delay.as_millis()).collect();
        assert_eq!(delays, vec![130, 120, 130]);

        let seen = decoder.seen.lock().unwrap();
        assert!(seen[0].to_string_lossy().ends_with(".webm"));
        assert!(is_empty(dir.path()));
    }

    #[tokio::test]
    async fn eight_sampled_frames_play_for_one_second() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = Arc::new(SyntheticDecoder::new(32, (16, 16)));
        let conv = converter(decoder, dir.path(), Duration::from_secs(5));

        let out = conv.convert("https://x/a.mp4", b"fake video").await.unwrap();
        let frames = decode_frames(&out.gif).unwrap();
        assert_eq!(frames.len(), 8);
        let total: Duration = frames.iter().map(|f| f.delay).sum();
        assert_eq!(total, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn unknown_suffix_defaults_to_mp4() {
        let dir = tempfile::tempdir().unwrap();
        let decoder = Arc::new(SyntheticDecoder::new(1, (8, 8)));
        let conv = converter(decoder.clone(), dir.path(), Duration::from_secs(5));
        conv.convert("https://cdn.example/download", b"x").await.unwrap();
        assert!(decoder.seen.lock().unwrap()[0].to_string_lossy().ends_with(".mp4"));
    }

    #[tokio::test]
    async fn decode_error_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let conv = converter(Arc::new(FailingDecoder), dir.path(), Duration::from_secs(5));
        let err = conv.convert("https://x/a.mp4", b"junk").await.unwrap_err();
        assert_eq!(err.kind(), "decode");
        assert!(is_empty(dir.path()));
    }

    #[tokio::test]
    async fn deadline_expiry_is_timeout_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let mut slow = SyntheticDecoder::new(1_000, (8, 8));
        slow.delay = Duration::from_millis(20);
        let conv = converter(Arc::new(slow), dir.path(), Duration::from_millis(100));

        let err = conv.convert("https://x/a.mp4", b"junk").await.unwrap_err();
        assert!(matches!(err, MediaError::Timeout(d) if d == Duration::from_millis(100)));
        assert!(is_empty(dir.path()));

        // The cancelled worker gives its slot back once it notices the flag.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(conv.pool().available(), conv.pool().size());
    }
}

//! Video frame decoders.
//!
//! Decoding runs on a blocking worker; implementations check the cancel flag
//! between frames and stop early once it is raised.

use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};

use gifsmith_core::MediaError;
use image::RgbaImage;
use serde_json::Value;
use tracing::debug;

/// Which frames to keep and how large they may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplePlan {
    /// Keep frames whose index is a multiple of this.
    pub step: u32,
    /// Frames taller than this are scaled to exactly this height.
    pub max_height: u32,
}

impl SamplePlan {
    pub fn keeps(&self, index: u64) -> bool {
        index % u64::from(self.step.max(1)) == 0
    }

    /// Output size for a `width`×`height` source, preserving aspect ratio.
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        if height <= self.max_height || height == 0 {
            return (width, height);
        }
        let scaled = (f64::from(width) * f64::from(self.max_height) / f64::from(height)).round();
        ((scaled as u32).max(1), self.max_height)
    }
}

pub trait VideoDecoder: Send + Sync {
    /// Decode the video at `path`, returning the frames `plan` keeps, already scaled.
    fn decode(
        &self,
        path: &Path,
        plan: &SamplePlan,
        cancel: &AtomicBool,
    ) -> Result<Vec<RgbaImage>, MediaError>;
}

/// Decodes by piping raw RGBA frames out of the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegCliDecoder {
    ffmpeg: Option<PathBuf>,
    ffprobe: Option<PathBuf>,
}

impl FfmpegCliDecoder {
    /// Use binaries from `dir`, or look them up on `PATH`.
    pub fn locate(dir: Option<&Path>) -> Self {
        let find = |name: &str| match dir {
            Some(dir) => {
                let candidate = dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX));
                candidate.is_file().then_some(candidate)
            }
            None => which::which(name).ok(),
        };
        let decoder = Self {
            ffmpeg: find("ffmpeg"),
            ffprobe: find("ffprobe"),
        };
        debug!(ffmpeg = ?decoder.ffmpeg, ffprobe = ?decoder.ffprobe, "Located ffmpeg binaries");
        decoder
    }

    pub fn is_available(&self) -> bool {
        self.ffmpeg.is_some() && self.ffprobe.is_some()
    }

    /// Display size of the first video stream, accounting for rotation metadata.
    fn probe_dimensions(&self, path: &Path) -> Result<(u32, u32), MediaError> {
        let ffprobe = self
            .ffprobe
            .as_ref()
            .ok_or_else(|| MediaError::Decode("ffprobe not found".into()))?;

        let output = Command::new(ffprobe)
            .args(["-v", "error", "-select_streams", "v:0", "-show_streams", "-of", "json"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MediaError::Decode(format!("could not run ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(MediaError::Decode(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let json: Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| MediaError::Decode(format!("unreadable ffprobe output: {e}")))?;
        parse_probe(&json)
    }
}

/// Pull width/height out of `ffprobe -show_streams -of json`, swapping them for
/// 90°/270° rotated streams since ffmpeg auto-rotates on decode.
fn parse_probe(json: &Value) -> Result<(u32, u32), MediaError> {
    let stream = json["streams"]
        .get(0)
        .ok_or_else(|| MediaError::Decode("no video stream".into()))?;

    let dim = |key: &str| {
        stream[key]
            .as_u64()
            .filter(|v| *v > 0)
            .map(|v| v as u32)
            .ok_or_else(|| MediaError::Decode(format!("video stream has no {key}")))
    };
    let (width, height) = (dim("width")?, dim("height")?);

    let rotation = stream["side_data_list"]
        .as_array()
        .into_iter()
        .flatten()
        .find_map(|side| side["rotation"].as_f64())
        .or_else(|| stream["tags"]["rotate"].as_str().and_then(|r| r.parse().ok()))
        .unwrap_or(0.0);

    if (rotation.abs() as i64) % 180 == 90 {
        Ok((height, width))
    } else {
        Ok((width, height))
    }
}

impl VideoDecoder for FfmpegCliDecoder {
    fn decode(
        &self,
        path: &Path,
        plan: &SamplePlan,
        cancel: &AtomicBool,
    ) -> Result<Vec<RgbaImage>, MediaError> {
        let ffmpeg = self
            .ffmpeg
            .as_ref()
            .ok_or_else(|| MediaError::Decode("ffmpeg not found".into()))?;

        let (width, height) = self.probe_dimensions(path)?;
        let (out_w, out_h) = plan.target_size(width, height);

        let mut child = Command::new(ffmpeg)
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-map", "0:v:0", "-vf"])
            .arg(format!("scale={out_w}:{out_h}"))
            .args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MediaError::Decode(format!("could not run ffmpeg: {e}")))?;

        // Drain stderr on its own thread so a chatty ffmpeg can't block on a full pipe.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut text = String::new();
                let _ = stderr.read_to_string(&mut text);
                text
            })
        });

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::Decode("ffmpeg stdout unavailable".into()))?;

        let frame_len = out_w as usize * out_h as usize * 4;
        let mut frames = Vec::new();
        let mut index: u64 = 0;
        let mut read_result = Ok(());

        loop {
            if cancel.load(Ordering::Relaxed) {
                let _ = child.kill();
                read_result = Err(MediaError::Decode("decode cancelled".into()));
                break;
            }
            let mut buf = vec![0u8; frame_len];
            match stdout.read_exact(&mut buf) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(e) => {
                    let _ = child.kill();
                    read_result = Err(MediaError::Io(e));
                    break;
                }
            }
            if plan.keeps(index) {
                // `buf` is exactly one frame, so this always succeeds.
                if let Some(frame) = RgbaImage::from_raw(out_w, out_h, buf) {
                    frames.push(frame);
                }
            }
            index += 1;
        }

        let status = child.wait()?;
        let stderr = stderr_reader
            .and_then(|h| h.join().ok())
            .unwrap_or_default();
        read_result?;

        if !status.success() {
            return Err(MediaError::Decode(format!("ffmpeg failed: {}", stderr.trim())));
        }
        if frames.is_empty() {
            return Err(MediaError::Decode("video contains no frames".into()));
        }
        debug!(decoded = index, kept = frames.len(), out_w, out_h, "Decoded video");
        Ok(frames)
    }
}

use std::path::PathBuf;
use std::time::Duration;

use crate::gif_encode::frame_delays;

/// Resolved pipeline settings. Every field has a concrete value; the binary
/// builds this from the YAML config after defaults are applied.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// When false, video sources short-circuit with a "disabled" outcome.
    pub video_enabled: bool,
    pub fetch_timeout: Duration,
    /// Ceiling on pool hand-off plus video decode.
    pub video_deadline: Duration,
    pub worker_pool_size: usize,
    /// Keep every Nth decoded video frame.
    pub frame_step: u32,
    pub max_video_height: u32,
    pub video_fps: u32,
    /// Caption font override. `None` uses the font bundled with the crate.
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
    pub caption_padding: u32,
    pub line_padding: u32,
    pub temp_dir: Option<PathBuf>,
    pub ffmpeg_dir: Option<PathBuf>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            video_enabled: true,
            fetch_timeout: Duration::from_secs(30),
            video_deadline: Duration::from_secs(60),
            worker_pool_size: 2,
            frame_step: 4,
            max_video_height: 480,
            video_fps: 8,
            font_path: None,
            font_size: 60.0,
            caption_padding: 20,
            line_padding: 10,
            temp_dir: None,
            ffmpeg_dir: None,
        }
    }
}

impl MediaConfig {
    /// Display times for `count` converted video frames.
    pub fn video_frame_delays(&self, count: usize) -> Vec<Duration> {
        frame_delays(self.video_fps, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_fps_alternates_130_and_120ms() {
        let delays = MediaConfig::default().video_frame_delays(4);
        let ms: Vec<u128> = delays.iter().map(Duration::as_millis).collect();
        assert_eq!(ms, vec![130, 120, 130, 120]);
    }

    #[test]
    fn total_duration_tracks_frame_rate() {
        let config = MediaConfig::default();
        for count in [1usize, 3, 8, 17, 80] {
            let total: Duration = config.video_frame_delays(count).into_iter().sum();
            let ideal = count as f64 * 1000.0 / 8.0;
            assert!((total.as_millis() as f64 - ideal).abs() <= 5.0, "{count}: {total:?}");
        }
        let total: Duration = config.video_frame_delays(8).into_iter().sum();
        assert_eq!(total, Duration::from_secs(1));
    }

    #[test]
    fn delays_are_whole_centiseconds() {
        let config = MediaConfig {
            video_fps: 7,
            ..MediaConfig::default()
        };
        assert!(config
            .video_frame_delays(30)
            .iter()
            .all(|d| d.as_millis() % 10 == 0 && !d.is_zero()));
    }
}

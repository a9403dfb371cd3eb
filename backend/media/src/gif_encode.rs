//! GIF encoding shared by all three paths.

use std::io::Cursor;
use std::time::Duration;

use bytes::Bytes;
use gifsmith_core::MediaError;
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Delay, Frame, ImageError, ImageFormat, RgbImage, RgbaImage};

/// NeuQuant sampling factor: 1 is best quality, 30 fastest.
const ENCODE_SPEED: i32 = 10;

/// Delay used when a source frame declares none.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// A decoded frame and how long it is shown.
#[derive(Debug, Clone)]
pub struct GifFrame {
    pub image: RgbaImage,
    pub delay: Duration,
}

/// Delays for `count` frames played at `fps`.
///
/// GIF delays are whole centiseconds, so each frame gets the gap between
/// consecutive rounded timestamps. The running total never drifts more than
/// 5 ms from `count / fps` seconds.
pub fn frame_delays(fps: u32, count: usize) -> Vec<Duration> {
    let fps = u64::from(fps.max(1));
    // round(n * 100 / fps), half up
    let centis = |n: u64| (n * 200 + fps) / (2 * fps);
    (0..count as u64)
        .map(|i| Duration::from_millis((centis(i + 1) - centis(i)) * 10))
        .collect()
}

/// Encode an animated GIF that loops forever.
pub fn encode_animation(frames: Vec<GifFrame>) -> Result<Bytes, MediaError> {
    if frames.is_empty() {
        return Err(MediaError::Encode("no frames to encode".into()));
    }

    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut buf, ENCODE_SPEED);
        encoder.set_repeat(Repeat::Infinite).map_err(encode_error)?;
        encoder
            .encode_frames(frames.into_iter().map(|f| {
                Frame::from_parts(f.image, 0, 0, Delay::from_saturating_duration(f.delay))
            }))
            .map_err(encode_error)?;
    }
    Ok(Bytes::from(buf))
}

/// Encode a single still frame as a palette GIF.
pub fn encode_still(image: RgbImage) -> Result<Bytes, MediaError> {
    let rgba = image::DynamicImage::ImageRgb8(image).to_rgba8();
    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut buf, ENCODE_SPEED);
        encoder
            .encode_frame(Frame::new(rgba))
            .map_err(encode_error)?;
    }
    Ok(Bytes::from(buf))
}

/// Decode every frame of an image payload.
///
/// GIFs yield all of their frames with the declared delay (or
/// [`DEFAULT_FRAME_DELAY`] when a frame declares zero). Any other still image
/// format yields one frame.
pub fn decode_frames(bytes: &[u8]) -> Result<Vec<GifFrame>, MediaError> {
    let format = image::guess_format(bytes).map_err(decode_error)?;

    let frames = if format == ImageFormat::Gif {
        let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(decode_error)?;
        decoder
            .into_frames()
            .collect_frames()
            .map_err(decode_error)?
            .into_iter()
            .map(|frame| {
                let delay = declared_delay(frame.delay());
                GifFrame {
                    image: frame.into_buffer(),
                    delay,
                }
            })
            .collect::<Vec<_>>()
    } else {
        let image = image::load_from_memory_with_format(bytes, format).map_err(decode_error)?;
        vec![GifFrame {
            image: image.to_rgba8(),
            delay: DEFAULT_FRAME_DELAY,
        }]
    };

    if frames.is_empty() {
        return Err(MediaError::Decode("image contains no frames".into()));
    }
    Ok(frames)
}

fn declared_delay(delay: Delay) -> Duration {
    let (numer, denom) = delay.numer_denom_ms();
    if numer == 0 || denom == 0 {
        DEFAULT_FRAME_DELAY
    } else {
        Duration::from_micros(u64::from(numer) * 1000 / u64::from(denom))
    }
}

pub(crate) fn decode_error(err: ImageError) -> MediaError {
    MediaError::Decode(err.to_string())
}

pub(crate) fn encode_error(err: ImageError) -> MediaError {
    MediaError::Encode(err.to_string())
}

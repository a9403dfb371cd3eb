//! Caption compositing: overlay wrapped text in a band above every frame of a GIF.

pub mod compose;
pub mod font;
pub mod layout;

pub use compose::compose_frame;
pub use font::CaptionFont;
pub use layout::{wrap_caption, CaptionLayout, CaptionStyle, LayoutLine};

use bytes::Bytes;
use gifsmith_core::MediaError;

use crate::gif_encode::{decode_frames, encode_animation, GifFrame};

/// Output of a successful captioning run.
#[derive(Debug, Clone)]
pub struct Captioned {
    pub gif: Bytes,
    pub frames: usize,
    pub band_height: u32,
}

/// Decode every frame of `bytes`, add the caption band, and re-encode.
///
/// All frames are decoded up front since the layout depends on the frame
/// width. Errors are wrapped as `MediaError::Composite`.
pub fn caption_frames(
    bytes: &[u8],
    text: &str,
    font: &CaptionFont,
    style: CaptionStyle,
) -> Result<Captioned, MediaError> {
    let frames = decode_frames(bytes).map_err(MediaError::into_composite)?;
    let width = frames[0].image.width();
    let layout = CaptionLayout::compute(text, font, width, style);

    let composed: Vec<GifFrame> = frames
        .iter()
        .map(|frame| GifFrame {
            image: compose_frame(&frame.image, &layout, font),
            delay: frame.delay,
        })
        .collect();
    let count = composed.len();

    let gif = encode_animation(composed).map_err(MediaError::into_composite)?;
    Ok(Captioned {
        gif,
        frames: count,
        band_height: layout.band_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::time::Duration;

    fn animated(frames: &[(u8, u64)], w: u32, h: u32) -> Bytes {
        encode_animation(
            frames
                .iter()
                .map(|&(shade, ms)| GifFrame {
                    image: RgbaImage::from_pixel(w, h, Rgba([shade, shade, 0, 255])),
                    delay: Duration::from_millis(ms),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn preserves_frame_count_and_delays() {
        let src = animated(&[(0, 80), (120, 80), (240, 80)], 64, 32);
        let font = CaptionFont::builtin(8.0);
        let out = caption_frames(&src, "top text", &font, CaptionStyle::default()).unwrap();
        assert_eq!(out.frames, 3);

        let decoded = decode_frames(&out.gif).unwrap();
        assert_eq!(decoded.len(), 3);
        for frame in &decoded {
            assert_eq!(frame.image.dimensions(), (64, 32 + out.band_height));
            assert_eq!(frame.delay, Duration::from_millis(80));
        }
    }

    #[test]
    fn undeclared_delay_becomes_100ms() {
        let src = animated(&[(0, 0), (255, 0)], 16, 16);
        let font = CaptionFont::builtin(8.0);
        let out = caption_frames(&src, "x", &font, CaptionStyle::default()).unwrap();
        for frame in decode_frames(&out.gif).unwrap() {
            assert_eq!(frame.delay, Duration::from_millis(100));
        }
    }

    #[test]
    fn long_caption_grows_the_band() {
        let src = animated(&[(0, 100)], 40, 40);
        let font = CaptionFont::builtin(8.0);
        let style = CaptionStyle::default();
        let short = caption_frames(&src, "a", &font, style).unwrap();
        let long = caption_frames(&src, "a b c d e f", &font, style).unwrap();
        assert!(long.band_height > short.band_height);
    }

    #[test]
    fn bundled_font_wraps_and_keeps_text_in_band() {
        let src = animated(&[(255, 100)], 400, 120);
        let font = CaptionFont::bundled(60.0);
        assert!(!font.is_builtin());
        let style = CaptionStyle::default();
        let text = "when the build finally passes on a friday";

        let layout = CaptionLayout::compute(text, &font, 400, style);
        assert!(layout.lines.len() > 1);
        for line in &layout.lines {
            if line.text.contains(' ') {
                assert!(line.width <= layout::max_line_width(400), "{line:?}");
            }
        }
        let heights: u32 = layout.lines.iter().map(|l| l.height).sum();
        let gaps = style.line_padding * (layout.lines.len() as u32 - 1);
        assert_eq!(layout.band_height, 2 * style.padding + heights + gaps);

        let out = caption_frames(&src, text, &font, style).unwrap();
        assert_eq!(out.band_height, layout.band_height);
        let decoded = decode_frames(&out.gif).unwrap();
        let frame = &decoded[0].image;
        assert_eq!(frame.height(), 120 + out.band_height);
        let mut ink_rows = Vec::new();
        for (_, y, px) in frame.enumerate_pixels() {
            if px[0] < 100 && px[1] < 100 && px[2] < 100 {
                ink_rows.push(y);
            }
        }
        assert!(!ink_rows.is_empty());
        let top = style.padding.saturating_sub(2);
        assert!(ink_rows.iter().all(|&y| y >= top && y < out.band_height));
    }

    #[test]
    fn undecodable_input_is_composite_error() {
        let font = CaptionFont::builtin(8.0);
        let err = caption_frames(b"GIF89a-but-truncated", "x", &font, CaptionStyle::default())
            .unwrap_err();
        assert_eq!(err.kind(), "composite");
        assert_eq!(err.root().kind(), "decode");
    }
}

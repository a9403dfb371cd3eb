use image::{imageops, Rgba, RgbaImage};

use super::font::CaptionFont;
use super::layout::CaptionLayout;

const BAND_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Extend `frame` upward by the caption band and draw the caption into it.
pub fn compose_frame(frame: &RgbaImage, layout: &CaptionLayout, font: &CaptionFont) -> RgbaImage {
    let (width, height) = frame.dimensions();
    let mut canvas = RgbaImage::from_pixel(width, height + layout.band_height, BAND_BACKGROUND);
    imageops::replace(&mut canvas, frame, 0, i64::from(layout.band_height));

    for (line, top) in layout.lines.iter().zip(layout.line_offsets()) {
        let x = width.saturating_sub(line.width) / 2;
        font.draw(&mut canvas, x as i32, top as i32, &line.text, TEXT_COLOR);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caption::layout::CaptionStyle;

    #[test]
    fn frame_is_pasted_below_white_band() {
        let font = CaptionFont::builtin(8.0);
        let frame = RgbaImage::from_pixel(50, 10, Rgba([10, 200, 30, 255]));
        let layout = CaptionLayout::compute("hi", &font, 50, CaptionStyle::default());
        let out = compose_frame(&frame, &layout, &font);

        assert_eq!(out.dimensions(), (50, 10 + layout.band_height));
        assert_eq!(*out.get_pixel(0, 0), BAND_BACKGROUND);
        assert_eq!(*out.get_pixel(49, layout.band_height), Rgba([10, 200, 30, 255]));
        assert_eq!(*out.get_pixel(0, layout.band_height + 9), Rgba([10, 200, 30, 255]));
    }

    #[test]
    fn text_lands_inside_the_band() {
        let font = CaptionFont::builtin(8.0);
        let frame = RgbaImage::from_pixel(80, 20, Rgba([255, 255, 255, 255]));
        let layout = CaptionLayout::compute("HHH", &font, 80, CaptionStyle::default());
        let out = compose_frame(&frame, &layout, &font);

        let dark: Vec<(u32, u32)> = out
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] == 0)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!dark.is_empty());
        assert!(dark.iter().all(|&(_, y)| y >= layout.padding && y < layout.band_height));
        // Centred: equal margins within one glyph cell.
        let min_x = dark.iter().map(|&(x, _)| x).min().unwrap();
        let max_x = dark.iter().map(|&(x, _)| x).max().unwrap();
        assert!((min_x as i64 - (79 - max_x) as i64).abs() <= 8);
    }
}

//! Caption fonts: an override TTF/OTF from disk, the bundled DejaVu Sans, or a
//! built-in bitmap fallback when neither parses.

use std::path::Path;

use ab_glyph::{Font, FontVec, GlyphId, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};
use tracing::{info, warn};

static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Cell size of the fallback glyphs.
const BITMAP_CELL: u32 = 8;

/// Largest block size a fallback glyph pixel is drawn at.
const MAX_BITMAP_SCALE: f32 = 32.0;

pub enum CaptionFont {
    Vector { font: FontVec, scale: PxScale },
    /// 8×8 glyphs, each source pixel drawn as a `scale`×`scale` block.
    Bitmap { scale: u32 },
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptionFont::Vector { scale, .. } => write!(f, "CaptionFont::Vector({}px)", scale.y),
            CaptionFont::Bitmap { scale } => write!(f, "CaptionFont::Bitmap(x{scale})"),
        }
    }
}

impl CaptionFont {
    /// The caption font for a config: the file at `path` when one is set,
    /// otherwise the font bundled with the crate.
    pub fn resolve(path: Option<&Path>, size: f32) -> Self {
        match path {
            Some(path) => Self::load(path, size),
            None => Self::bundled(size),
        }
    }

    /// Load the font at `path`. A missing or unreadable font is logged and
    /// replaced by the bundled one; this never fails.
    pub fn load(path: &Path, size: f32) -> Self {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Caption font not found; using bundled font");
                return Self::bundled(size);
            }
        };
        match FontVec::try_from_vec(data) {
            Ok(font) => {
                info!(path = %path.display(), size, "Loaded caption font");
                Self::vector(font, size)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Caption font is invalid; using bundled font");
                Self::bundled(size)
            }
        }
    }

    /// DejaVu Sans, compiled into the binary.
    pub fn bundled(size: f32) -> Self {
        match FontVec::try_from_vec(BUNDLED_FONT.to_vec()) {
            Ok(font) => Self::vector(font, size),
            Err(e) => {
                warn!(error = %e, "Bundled caption font is unreadable; using bitmap font");
                Self::builtin(size)
            }
        }
    }

    fn vector(font: FontVec, size: f32) -> Self {
        CaptionFont::Vector {
            font,
            scale: PxScale::from(size),
        }
    }

    /// The fallback font, scaled to roughly `size` pixels tall.
    pub fn builtin(size: f32) -> Self {
        let scale = (size / BITMAP_CELL as f32).round().clamp(1.0, MAX_BITMAP_SCALE) as u32;
        CaptionFont::Bitmap { scale }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, CaptionFont::Bitmap { .. })
    }

    /// Advance width of `text` in pixels, trailing whitespace included.
    pub fn measure(&self, text: &str) -> u32 {
        match self {
            CaptionFont::Vector { font, scale } => {
                let scaled = font.as_scaled(*scale);
                let mut width = 0.0f32;
                let mut prev: Option<GlyphId> = None;
                for c in text.chars() {
                    let id = scaled.glyph_id(c);
                    if let Some(p) = prev {
                        width += scaled.kern(p, id);
                    }
                    width += scaled.h_advance(id);
                    prev = Some(id);
                }
                width.max(0.0).ceil() as u32
            }
            CaptionFont::Bitmap { scale } => text.chars().count() as u32 * BITMAP_CELL * scale,
        }
    }

    /// Height of one line of text in pixels.
    pub fn line_height(&self) -> u32 {
        match self {
            CaptionFont::Vector { font, scale } => {
                let scaled = font.as_scaled(*scale);
                (scaled.ascent() - scaled.descent()).ceil().max(1.0) as u32
            }
            CaptionFont::Bitmap { scale } => BITMAP_CELL * scale,
        }
    }

    /// Draw `text` with its top-left corner at (`x`, `y`).
    pub fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        match self {
            CaptionFont::Vector { font, scale } => {
                imageproc::drawing::draw_text_mut(canvas, color, x, y, *scale, font, text);
            }
            CaptionFont::Bitmap { scale } => draw_bitmap_text(canvas, x, y, *scale, text, color),
        }
    }
}

fn draw_bitmap_text(canvas: &mut RgbaImage, x: i32, y: i32, scale: u32, text: &str, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    let cell = (BITMAP_CELL * scale) as i32;

    for (i, c) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(c) else { continue };
        let origin_x = x + i as i32 * cell;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..BITMAP_CELL {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = origin_x + (col * scale) as i32;
                let py = y + (row as u32 * scale) as i32;
                for dy in 0..scale as i32 {
                    for dx in 0..scale as i32 {
                        let (tx, ty) = (px + dx, py + dy);
                        if tx >= 0 && ty >= 0 && (tx as u32) < width && (ty as u32) < height {
                            canvas.put_pixel(tx as u32, ty as u32, color);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_bundled() {
        let font = CaptionFont::load(Path::new("/no/such/font.ttf"), 60.0);
        assert!(!font.is_builtin());
        assert!((59..=61).contains(&font.line_height()));
    }

    #[test]
    fn invalid_file_falls_back_to_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"this is not a font").unwrap();
        assert!(!CaptionFont::load(&path, 32.0).is_builtin());
    }

    #[test]
    fn unset_path_uses_bundled_font() {
        assert!(!CaptionFont::resolve(None, 24.0).is_builtin());
        assert!(CaptionFont::builtin(24.0).is_builtin());
    }

    #[test]
    fn vector_measure_grows_with_text() {
        let font = CaptionFont::bundled(40.0);
        let word = font.measure("caption");
        assert!(word > 0);
        assert!(font.measure("caption ") > word);
        assert!(font.measure("caption caption") > 2 * word);
        assert_eq!(font.measure(""), 0);
        // Proportional: "i" is narrower than "W".
        assert!(font.measure("iiii") < font.measure("WWWW"));
    }

    #[test]
    fn vector_draw_stays_within_line_box() {
        let font = CaptionFont::bundled(40.0);
        let text = "Ågj";
        let (w, h) = (font.measure(text) + 20, font.line_height() + 40);
        let mut canvas = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]));
        font.draw(&mut canvas, 10, 20, text, Rgba([0, 0, 0, 255]));

        let ink: Vec<(u32, u32)> = canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] < 128)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!ink.is_empty());
        let line_bottom = 20 + font.line_height();
        assert!(ink.iter().all(|&(_, y)| (18..=line_bottom + 2).contains(&y)));
    }

    #[test]
    fn bitmap_scale_is_bounded() {
        for size in [f32::INFINITY, 1e12] {
            let font = CaptionFont::builtin(size);
            assert_eq!(font.line_height(), BITMAP_CELL * 32);
            assert_eq!(font.measure("abc"), 3 * BITMAP_CELL * 32);
        }
        assert_eq!(CaptionFont::builtin(0.0).line_height(), BITMAP_CELL);
    }

    #[test]
    fn bitmap_measure_counts_spaces() {
        let font = CaptionFont::builtin(16.0);
        assert_eq!(font.measure("ab"), 32);
        assert_eq!(font.measure("ab "), 48);
    }

    #[test]
    fn bitmap_draw_marks_pixels_and_clips() {
        let font = CaptionFont::builtin(8.0);
        let mut canvas = RgbaImage::from_pixel(20, 10, Rgba([255, 255, 255, 255]));
        font.draw(&mut canvas, -4, 2, "HI", Rgba([0, 0, 0, 255]));
        assert!(canvas.pixels().any(|p| p[0] == 0));
    }
}

//! Pixel-width-aware word wrapping and caption band geometry.

use super::font::CaptionFont;

/// Share of the frame width available to text (20% margin on each side).
pub const TEXT_WIDTH_RATIO: f32 = 0.6;

#[derive(Debug, Clone, Copy)]
pub struct CaptionStyle {
    /// Space above the first line and below the last.
    pub padding: u32,
    /// Space between consecutive lines.
    pub line_padding: u32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            padding: 20,
            line_padding: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutLine {
    pub text: String,
    pub width: u32,
    pub height: u32,
}

/// Wrapped caption lines plus the height of the band that holds them.
#[derive(Debug, Clone)]
pub struct CaptionLayout {
    pub lines: Vec<LayoutLine>,
    pub band_height: u32,
    pub padding: u32,
    pub line_padding: u32,
}

impl CaptionLayout {
    /// Lay out `text` for frames `frame_width` pixels wide.
    pub fn compute(text: &str, font: &CaptionFont, frame_width: u32, style: CaptionStyle) -> Self {
        let max_width = max_line_width(frame_width);
        let lines: Vec<LayoutLine> = wrap_caption(text, font, max_width)
            .into_iter()
            .map(|line| LayoutLine {
                width: font.measure(&line),
                height: font.line_height(),
                text: line,
            })
            .collect();

        let text_height: u32 = lines.iter().map(|l| l.height).sum();
        let gaps = lines.len().saturating_sub(1) as u32;
        let band_height = style.padding * 2 + text_height + style.line_padding * gaps;

        Self {
            lines,
            band_height,
            padding: style.padding,
            line_padding: style.line_padding,
        }
    }

    /// Top edge of each line, in band coordinates.
    pub fn line_offsets(&self) -> Vec<u32> {
        let mut y = self.padding;
        self.lines
            .iter()
            .map(|line| {
                let top = y;
                y += line.height + self.line_padding;
                top
            })
            .collect()
    }
}

pub fn max_line_width(frame_width: u32) -> u32 {
    (frame_width as f32 * TEXT_WIDTH_RATIO).floor() as u32
}

/// Greedily pack whitespace-separated words into lines no wider than
/// `max_width`, measured with a trailing space. A word that does not fit on
/// its own still gets a line; words are never split.
pub fn wrap_caption(text: &str, font: &CaptionFont, max_width: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = format!("{current}{word} ");
        if current.is_empty() || font.measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(current.trim_end().to_string());
            current = format!("{word} ");
        }
    }
    if !current.is_empty() {
        lines.push(current.trim_end().to_string());
    }
    lines
}

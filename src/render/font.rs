// SPDX-License-Identifier: GPL-3.0-or-later
use image::{GrayImage, Luma};

use crate::image_buffer::TextMask;

use super::settings::RenderSettings;

pub(crate) trait TextRenderer: std::fmt::Debug {
    /// Render a single line of text onto a mask image.
    ///
    /// The mask is just large enough for the text, and each pixel is the opacity of the text at
    /// that point.
    fn render_line(&self, text: &str) -> anyhow::Result<TextMask>;
}

/// Create a text renderer based on the settings and what has been enabled for this build.
pub(crate) fn default_renderer(settings: &RenderSettings) -> anyhow::Result<Box<dyn TextRenderer>> {
    match &settings.font_path {
        None => Ok(Box::new(BitmapFont::new(settings.font_size))),
        #[cfg(feature = "render_fontdue")]
        Some(path) => Ok(Box::new(super::cheese::FontdueRenderer::from_path(
            path,
            settings.font_size,
        )?)),
        #[cfg(not(feature = "render_fontdue"))]
        Some(path) => anyhow::bail!(
            "Unable to use {}: TrueType font support was not enabled for this build",
            path.display()
        ),
    }
}

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// Horizontal distance between the start of one glyph and the next, in dots.
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

/// Each row is five bits, with the most significant bit on the left.
fn glyph(character: char) -> Option<[u8; GLYPH_HEIGHT as usize]> {
    let rows = match character {
        ' ' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '/' => [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000],
        '%' => [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '°' => [0b01100, 0b10010, 0b10010, 0b01100, 0b00000, 0b00000, 0b00000],
        _ => return None,
    };
    Some(rows)
}

/// A fixed 5x7 dot font, scaled up by drawing each dot as a square.
///
/// Lower case letters are drawn as upper case, and characters without a glyph are left blank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BitmapFont {
    dot_size: u32,
}

impl BitmapFont {
    /// Create a bitmap font with glyphs roughly `font_size` pixels tall.
    pub(crate) fn new(font_size: f32) -> Self {
        let dot_size = (font_size / GLYPH_HEIGHT as f32).round().max(1.0) as u32;
        Self { dot_size }
    }

    pub(crate) fn line_height(&self) -> u32 {
        GLYPH_HEIGHT * self.dot_size
    }

    fn fill_dot(&self, mask: &mut GrayImage, dot_x: u32, dot_y: u32) {
        let left = dot_x * self.dot_size;
        let top = dot_y * self.dot_size;
        for y in top..(top + self.dot_size) {
            for x in left..(left + self.dot_size) {
                mask.put_pixel(x, y, Luma([u8::MAX]));
            }
        }
    }
}

impl TextRenderer for BitmapFont {
    fn render_line(&self, text: &str) -> anyhow::Result<TextMask> {
        let characters: Vec<char> = text.chars().flat_map(char::to_uppercase).collect();
        let dots_wide = match characters.len() as u32 {
            0 => 0,
            // No trailing gap after the last glyph
            count => count * GLYPH_ADVANCE - 1,
        };
        let mut mask = GrayImage::new(dots_wide * self.dot_size, self.line_height());
        for (index, character) in characters.into_iter().enumerate() {
            let rows = match glyph(character) {
                Some(rows) => rows,
                None => continue,
            };
            let glyph_left = index as u32 * GLYPH_ADVANCE;
            for (dot_y, row) in rows.iter().enumerate() {
                for column in 0..GLYPH_WIDTH {
                    if row & (1 << (GLYPH_WIDTH - 1 - column)) != 0 {
                        self.fill_dot(&mut mask, glyph_left + column, dot_y as u32);
                    }
                }
            }
        }
        Ok(mask)
    }
}

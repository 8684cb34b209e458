// SPDX-License-Identifier: GPL-3.0-or-later
//! This module is a font renderer using the [fontdue] crate. Naming the module 'fontdue' would've
//! been my first choice, but then there'd be a conflict between the module and the crate.
use std::cell::RefCell;
use std::fmt;
use std::path::Path;

use anyhow::{anyhow, Context as _};
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use image::imageops::overlay;
use image::{GrayImage, ImageBuffer};
use tracing::debug;

use super::font::TextRenderer;
use crate::image_buffer::TextMask;

pub(crate) struct FontdueRenderer {
    font: Font,
    font_size: f32,
    layout: RefCell<Layout>,
}

impl FontdueRenderer {
    pub(crate) fn from_bytes(data: &[u8], font_size: f32) -> anyhow::Result<Self> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|err| anyhow!("Unable to parse font: {}", err))?;
        Ok(Self {
            font,
            font_size,
            layout: RefCell::new(Layout::new(CoordinateSystem::PositiveYDown)),
        })
    }

    pub(crate) fn from_path(path: &Path, font_size: f32) -> anyhow::Result<Self> {
        let data = std::fs::read(path)
            .with_context(|| format!("Unable to read font file {}", path.display()))?;
        let renderer = Self::from_bytes(&data, font_size)
            .with_context(|| format!("Unable to load font from {}", path.display()))?;
        debug!(path = %path.display(), font_size, "Loaded TrueType font");
        Ok(renderer)
    }
}

impl fmt::Debug for FontdueRenderer {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        // fontdue::layout::Layout doesn't implement Debug, so instead I'm just putting a dummy
        // blob in there.
        fmt.debug_struct("FontdueRenderer")
            .field("font", &self.font)
            .field("font_size", &self.font_size)
            .field("layout", &"RefCell<Layout{{ opaque }}>")
            .finish()
    }
}

impl TextRenderer for FontdueRenderer {
    fn render_line(&self, text: &str) -> anyhow::Result<TextMask> {
        // Reset the fontdue context to a known default
        let mut layout = self.layout.borrow_mut();
        layout.reset(&LayoutSettings {
            x: 0.0,
            y: 0.0,
            ..LayoutSettings::default()
        });
        let style = TextStyle::new(text, self.font_size, 0);
        layout.append(&[&self.font], &style);
        let glyphs = layout.glyphs().clone();
        // Size the mask to cover every glyph, but keep at least a full line of height so that
        // labels stay put when their text changes.
        let width = glyphs
            .iter()
            .map(|glyph| (glyph.x + glyph.width as f32).ceil().max(0.0) as u32)
            .max()
            .unwrap_or(0);
        let height = glyphs
            .iter()
            .map(|glyph| (glyph.y + glyph.height as f32).ceil().max(0.0) as u32)
            .fold(self.font_size.ceil() as u32, u32::max);
        // Transfer the rasterized glyphs from fontdue onto an image mask. The mask is just the
        // opacity for each pixel.
        let mut mask = GrayImage::new(width, height);
        for glyph in glyphs.iter() {
            let (metrics, bitmap) = self.font.rasterize_config(glyph.key);
            let bitmap: GrayImage =
                ImageBuffer::from_vec(metrics.width as u32, metrics.height as u32, bitmap)
                    .ok_or_else(|| {
                        anyhow!("Bitmap for glyph {} is too small", glyph.key.glyph_index)
                    })?;
            overlay(&mut mask, &bitmap, glyph.x.max(0.0) as u32, glyph.y.max(0.0) as u32);
        }
        Ok(mask)
    }
}

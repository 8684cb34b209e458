// SPDX-License-Identifier: GPL-3.0-or-later
use std::num::NonZeroU32;
use std::path::PathBuf;

use serde::Deserialize;

use super::annotate::TextColor;
use super::color_map::ColorMap;
use super::resize::{Method, OutputSize};

fn default_width() -> NonZeroU32 {
    NonZeroU32::new(640).expect("640 to be non-zero")
}

fn default_height() -> NonZeroU32 {
    NonZeroU32::new(480).expect("480 to be non-zero")
}

fn default_font_size() -> f32 {
    21.0
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct RenderSettings {
    /// The width (in pixels) of the rendered image.
    #[serde(default = "default_width")]
    pub(crate) width: NonZeroU32,

    /// The height (in pixels) of the rendered image.
    #[serde(default = "default_height")]
    pub(crate) height: NonZeroU32,

    #[serde(default)]
    pub(crate) colors: ColorMap,

    #[serde(default)]
    pub(crate) scaling_method: Method,

    #[serde(default)]
    pub(crate) text_color: TextColor,

    /// A TrueType font to draw text with instead of the built in bitmap font.
    #[serde(default)]
    pub(crate) font_path: Option<PathBuf>,

    /// Roughly how tall text should be, in pixels.
    #[serde(default = "default_font_size")]
    pub(crate) font_size: f32,
}

impl RenderSettings {
    pub(crate) fn output_size(&self) -> OutputSize {
        OutputSize {
            width: self.width,
            height: self.height,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            colors: ColorMap::default(),
            scaling_method: Method::default(),
            text_color: TextColor::default(),
            font_path: None,
            font_size: default_font_size(),
        }
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use image::{GrayImage, RgbImage};
use ndarray::Array2;

/// A grid of temperatures in degrees Celsius, indexed as `[[row, column]]`.
pub type TemperatureGrid = Array2<f32>;

/// Rendered images intended for viewing.
pub type ColorImage = RgbImage;

/// An opacity mask for rasterized text, where 0 is transparent and 255 opaque.
pub type TextMask = GrayImage;

// SPDX-License-Identifier: GPL-3.0-or-later
use std::num::NonZeroU32;

use image::imageops::{self, FilterType};
use image::RgbImage;
use serde::Deserialize;
use tracing::trace;

/// Different resizing methods
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Method {
    /// Nearest neighbor sampling.
    Nearest,

    /// Triangle (aka linear) sampling. This is the default.
    #[serde(alias = "linear", alias = "bilinear")]
    Triangle,

    /// Catmull-Rom (aka bicubic) sampling.
    #[serde(alias = "bicubic")]
    CatmullRom,

    /// Gaussian sampling.
    Gaussian,

    /// Lanczos sampling with a window size of 3.
    #[serde(alias = "lanczos")]
    Lanczos3,
}

impl Default for Method {
    fn default() -> Self {
        Self::Triangle
    }
}

impl From<Method> for FilterType {
    fn from(method: Method) -> Self {
        match method {
            Method::Nearest => FilterType::Nearest,
            Method::Triangle => FilterType::Triangle,
            Method::CatmullRom => FilterType::CatmullRom,
            Method::Gaussian => FilterType::Gaussian,
            Method::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Output dimensions for resized images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct OutputSize {
    pub(crate) width: NonZeroU32,
    pub(crate) height: NonZeroU32,
}

/// Resize an image to exactly the given size, ignoring the source aspect ratio.
pub(crate) fn resize(image: &RgbImage, size: OutputSize, method: Method) -> RgbImage {
    let (width, height) = (size.width.get(), size.height.get());
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    trace!(
        source_width = image.width(),
        source_height = image.height(),
        width,
        height,
        ?method,
        "Resizing image"
    );
    imageops::resize(image, width, height, method.into())
}

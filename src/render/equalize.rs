// SPDX-License-Identifier: GPL-3.0-or-later
//! Histogram equalization of the brightness of an image, leaving the hue alone.
//!
//! The image is split into YUV (using the analog BT.601 coefficients), only the Y channel is
//! equalized, then it's converted back to RGB.
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::stats::cumulative_histogram;

const LUMA_RED: f32 = 0.299;
const LUMA_GREEN: f32 = 0.587;
const LUMA_BLUE: f32 = 0.114;
const U_SCALE: f32 = 0.492;
const V_SCALE: f32 = 0.877;

/// The chroma components of a pixel, centered on zero.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Chroma {
    u: f32,
    v: f32,
}

fn rgb_to_yuv(pixel: &Rgb<u8>) -> (f32, Chroma) {
    let [red, green, blue] = pixel.0;
    let (red, green, blue) = (red as f32, green as f32, blue as f32);
    let luma = LUMA_RED * red + LUMA_GREEN * green + LUMA_BLUE * blue;
    let chroma = Chroma {
        u: U_SCALE * (blue - luma),
        v: V_SCALE * (red - luma),
    };
    (luma, chroma)
}

fn to_channel(value: f32) -> u8 {
    value.round().max(0.0).min(255.0) as u8
}

fn yuv_to_rgb(luma: f32, chroma: Chroma) -> Rgb<u8> {
    let Chroma { u, v } = chroma;
    Rgb([
        to_channel(luma + 1.140 * v),
        to_channel(luma - 0.394 * u - 0.581 * v),
        to_channel(luma + 2.032 * u),
    ])
}

/// Spread the levels of a channel over the full `0..=255` range.
///
/// The darkest level present maps to 0 and the brightest to 255. An image with only one level is
/// returned unchanged.
fn equalize_channel(channel: &GrayImage) -> GrayImage {
    let cdf = cumulative_histogram(channel).channels[0];
    let total = u64::from(cdf[255]);
    let cdf_min = u64::from(cdf.iter().copied().find(|count| *count > 0).unwrap_or(0));
    if total == cdf_min {
        return channel.clone();
    }
    let range = total - cdf_min;
    let mut lookup = [0u8; 256];
    for (level, count) in lookup.iter_mut().zip(cdf.iter()) {
        let above_min = u64::from(*count).saturating_sub(cdf_min);
        *level = ((above_min * 255 + range / 2) / range) as u8;
    }
    let mut equalized = channel.clone();
    for pixel in equalized.pixels_mut() {
        pixel[0] = lookup[pixel[0] as usize];
    }
    equalized
}

/// Equalize the brightness histogram of a color image.
pub(crate) fn equalize_luma(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut luma_image = GrayImage::new(width, height);
    let mut chroma = Vec::with_capacity(image.len() / 3);
    for (pixel, luma_pixel) in image.pixels().zip(luma_image.pixels_mut()) {
        let (luma, pixel_chroma) = rgb_to_yuv(pixel);
        *luma_pixel = Luma([to_channel(luma)]);
        chroma.push(pixel_chroma);
    }
    let equalized = equalize_channel(&luma_image);
    let mut output = RgbImage::new(width, height);
    for ((output_pixel, luma_pixel), pixel_chroma) in output
        .pixels_mut()
        .zip(equalized.pixels())
        .zip(chroma.into_iter())
    {
        *output_pixel = yuv_to_rgb(luma_pixel[0] as f32, pixel_chroma);
    }
    output
}

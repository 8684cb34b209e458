// SPDX-License-Identifier: GPL-3.0-or-later
use tracing::instrument;

use crate::image_buffer::{ColorImage, TemperatureGrid};

mod annotate;
#[cfg(feature = "render_fontdue")]
mod cheese;
mod color;
mod color_map;
mod equalize;
mod filter;
mod font;
mod resize;
mod settings;

pub(crate) use annotate::{frame_labels, Annotator, Label};
pub(crate) use color_map::ColorMap;
pub(crate) use font::default_renderer;
use resize::{Method, OutputSize};
pub(crate) use settings::RenderSettings;

/// Turns temperature grids into false color images.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ImagePipeline {
    color_map: ColorMap,
    size: OutputSize,
    method: Method,
}

impl ImagePipeline {
    pub(crate) fn new(color_map: ColorMap, size: OutputSize, method: Method) -> Self {
        Self {
            color_map,
            size,
            method,
        }
    }

    /// Normalize, smooth, colorize, equalize, then resize a grid.
    #[instrument(level = "trace", skip(self, grid))]
    pub(crate) fn render(&self, grid: &TemperatureGrid) -> ColorImage {
        let normalized = filter::normalize(grid);
        let smoothed = filter::smooth(&normalized);
        let colored = color_map::colorize(&smoothed, &self.color_map);
        let equalized = equalize::equalize_luma(&colored);
        resize::resize(&equalized, self.size, self.method)
    }
}

impl<'a> From<&'a RenderSettings> for ImagePipeline {
    fn from(settings: &'a RenderSettings) -> Self {
        Self::new(
            settings.colors,
            settings.output_size(),
            settings.scaling_method,
        )
    }
}

#[cfg(test)]
mod test {
    use std::num::NonZeroU32;

    use ndarray::Array2;

    use super::{ColorMap, ImagePipeline, Method, OutputSize, RenderSettings};

    fn gradient_grid() -> Array2<f32> {
        Array2::from_shape_fn((24, 32), |(row, col)| 20.0 + row as f32 * 0.5 + col as f32 * 0.25)
    }

    #[test]
    fn output_size() {
        let pipeline = ImagePipeline::from(&RenderSettings::default());
        let image = pipeline.render(&gradient_grid());
        assert_eq!(image.dimensions(), (640, 480));
    }

    #[test]
    fn custom_size() {
        let size = OutputSize {
            width: NonZeroU32::new(100).unwrap(),
            height: NonZeroU32::new(37).unwrap(),
        };
        let pipeline =
            ImagePipeline::new(ColorMap::Gradient(colorous::MAGMA), size, Method::Nearest);
        assert_eq!(pipeline.render(&gradient_grid()).dimensions(), (100, 37));
    }

    #[test]
    fn deterministic() {
        let pipeline = ImagePipeline::from(&RenderSettings::default());
        let grid = gradient_grid();
        assert_eq!(pipeline.render(&grid), pipeline.render(&grid));
    }

    #[test]
    fn constant_grid() {
        // Every cell normalizes to 0, so the whole image is the darkest jet color.
        let pipeline = ImagePipeline::from(&RenderSettings::default());
        let image = pipeline.render(&Array2::from_elem((24, 32), 25.0));
        let first = *image.get_pixel(0, 0);
        assert!(image.pixels().all(|p| *p == first));
        assert!(first[0] < 10 && first[1] < 10, "{:?}", first);
        assert!(first[2] > 100, "{:?}", first);
    }

    #[test]
    fn hot_corner_is_red() {
        let pipeline = ImagePipeline::from(&RenderSettings::default());
        let image = pipeline.render(&gradient_grid());
        let cold = image.get_pixel(0, 0);
        let hot = image.get_pixel(639, 479);
        assert!(cold[2] > cold[0], "cold corner {:?}", cold);
        assert!(hot[0] > hot[2], "hot corner {:?}", hot);
    }
}

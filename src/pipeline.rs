// SPDX-License-Identifier: GPL-3.0-or-later
use tracing::debug;

use crate::alert::{evaluate, Evaluation};
use crate::image_buffer::{ColorImage, TemperatureGrid};
use crate::render::{
    default_renderer, frame_labels, Annotator, ImagePipeline, Label, RenderSettings,
};
use crate::settings::ThresholdConfig;

/// A frame after it has been rendered, checked, and labelled.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ProcessedFrame {
    /// The rendered image without any labels.
    pub(crate) plain: ColorImage,

    /// The rendered image with labels drawn on it.
    pub(crate) image: ColorImage,

    pub(crate) evaluation: Evaluation,

    /// The labels drawn on `image`.
    pub(crate) labels: Vec<Label>,
}

/// Everything that happens to a grid between being read and being shown.
#[derive(Debug)]
pub(crate) struct FrameProcessor {
    pipeline: ImagePipeline,
    annotator: Annotator,
    thresholds: ThresholdConfig,
}

impl FrameProcessor {
    pub(crate) fn new(
        pipeline: ImagePipeline,
        annotator: Annotator,
        thresholds: ThresholdConfig,
    ) -> Self {
        Self {
            pipeline,
            annotator,
            thresholds,
        }
    }

    pub(crate) fn from_settings(
        settings: &RenderSettings,
        thresholds: ThresholdConfig,
    ) -> anyhow::Result<Self> {
        let annotator = Annotator::new(default_renderer(settings)?, settings.text_color);
        Ok(Self::new(
            ImagePipeline::from(settings),
            annotator,
            thresholds,
        ))
    }

    pub(crate) fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub(crate) fn process(&self, grid: &TemperatureGrid) -> anyhow::Result<ProcessedFrame> {
        let plain = self.pipeline.render(grid);
        let evaluation = evaluate(grid, &self.thresholds);
        debug!(mean = evaluation.mean, state = ?evaluation.state, "Evaluated frame");
        let labels = frame_labels(&evaluation, None);
        let image = self.annotator.annotate(&plain, &labels)?;
        Ok(ProcessedFrame {
            plain,
            image,
            evaluation,
            labels,
        })
    }

    /// Label a processed frame as a capture saved to `file_name`.
    pub(crate) fn capture_image(
        &self,
        frame: &ProcessedFrame,
        file_name: &str,
    ) -> anyhow::Result<ColorImage> {
        let labels = frame_labels(&frame.evaluation, Some(file_name));
        self.annotator.annotate(&frame.plain, &labels)
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use crate::image_buffer::TemperatureGrid;
use crate::settings::ThresholdConfig;
use crate::temperature::Temperature;

/// Which of the temperature limits the mean temperature has crossed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AlertState {
    Normal,
    AboveMax,
    BelowMin,

    /// Only possible when the maximum is configured below the minimum.
    Both,
}

impl AlertState {
    pub(crate) fn above_max(&self) -> bool {
        matches!(self, Self::AboveMax | Self::Both)
    }

    pub(crate) fn below_min(&self) -> bool {
        matches!(self, Self::BelowMin | Self::Both)
    }
}

/// The outcome of checking a frame against the configured limits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Evaluation {
    /// The mean temperature of the frame, in Celsius.
    pub(crate) mean: f32,
    pub(crate) state: AlertState,
}

impl Evaluation {
    pub(crate) fn mean_temperature(&self) -> Temperature {
        Temperature::Celsius(self.mean)
    }
}

/// The arithmetic mean of every cell in a grid, in Celsius.
pub(crate) fn mean_temperature(grid: &TemperatureGrid) -> f32 {
    if grid.is_empty() {
        return f32::NAN;
    }
    // Accumulate in f64; 768 f32 additions lose enough precision to move the first decimal.
    let sum: f64 = grid.iter().map(|t| *t as f64).sum();
    (sum / grid.len() as f64) as f32
}

/// Compare the mean temperature of a grid against the limits. Both comparisons are strict, so a
/// mean exactly at a limit doesn't raise an alert.
pub(crate) fn evaluate(grid: &TemperatureGrid, thresholds: &ThresholdConfig) -> Evaluation {
    let mean = mean_temperature(grid);
    let above_max = mean > thresholds.max_temp.in_celsius();
    let below_min = mean < thresholds.min_temp.in_celsius();
    let state = match (above_max, below_min) {
        (false, false) => AlertState::Normal,
        (true, false) => AlertState::AboveMax,
        (false, true) => AlertState::BelowMin,
        (true, true) => AlertState::Both,
    };
    Evaluation { mean, state }
}

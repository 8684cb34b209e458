// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;

use crate::error::{MalformedFrame, SourceError};
use crate::image_buffer::TemperatureGrid;

/// The dimensions of the grid a sample source produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct GridShape {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
}

impl GridShape {
    /// The MLX90640 is a 32x24 array, read out row by row.
    pub(crate) const MLX90640: Self = Self { rows: 24, cols: 32 };

    pub(crate) fn len(&self) -> usize {
        self.rows * self.cols
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

/// The temperatures a sensor can physically report, in degrees Celsius.
///
/// Anything outside of this range (or not a number at all) is treated as a corrupted read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SensorRange {
    pub(crate) min: f32,
    pub(crate) max: f32,
}

impl SensorRange {
    /// The object temperature range from the MLX90640 datasheet.
    pub(crate) const MLX90640: Self = Self {
        min: -40.0,
        max: 300.0,
    };

    pub(crate) fn contains(&self, value: f32) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// A source of raw temperature frames, such as a camera.
pub(crate) trait SampleSource: fmt::Debug {
    /// The shape of the frames returned by [`read_frame`][SampleSource::read_frame].
    fn shape(&self) -> GridShape;

    /// The range of values this source can legitimately produce.
    fn range(&self) -> SensorRange {
        SensorRange::MLX90640
    }

    /// Read a single frame as a flat, row-major list of temperatures in Celsius.
    ///
    /// This blocks until the sensor has a new frame available.
    fn read_frame(&mut self) -> Result<Vec<f32>, SourceError>;
}

impl<S> SampleSource for Box<S>
where
    S: SampleSource + ?Sized,
{
    fn shape(&self) -> GridShape {
        self.as_ref().shape()
    }

    fn range(&self) -> SensorRange {
        self.as_ref().range()
    }

    fn read_frame(&mut self) -> Result<Vec<f32>, SourceError> {
        self.as_mut().read_frame()
    }
}

/// Check a raw frame and reshape it into a grid.
pub(crate) fn reshape_frame(
    raw: Vec<f32>,
    shape: GridShape,
    range: SensorRange,
) -> Result<TemperatureGrid, MalformedFrame> {
    if raw.len() != shape.len() {
        return Err(MalformedFrame::Length {
            expected: shape.len(),
            actual: raw.len(),
        });
    }
    if let Some((index, value)) = raw
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| !range.contains(*value))
    {
        return Err(MalformedFrame::Value { index, value });
    }
    Ok(TemperatureGrid::from_shape_vec((shape.rows, shape.cols), raw)
        .expect("the frame length to already be checked against the shape"))
}

#[cfg(test)]
mod test {
    use crate::error::MalformedFrame;

    use super::{reshape_frame, GridShape, SensorRange};

    #[test]
    fn reshape_is_row_major() {
        let shape = GridShape { rows: 3, cols: 4 };
        let raw: Vec<f32> = (0..12).map(|n| n as f32).collect();
        let grid = reshape_frame(raw.clone(), shape, SensorRange::MLX90640).unwrap();
        assert_eq!(grid.dim(), (3, 4));
        for r in 0..shape.rows {
            for c in 0..shape.cols {
                assert_eq!(grid[[r, c]], raw[r * shape.cols + c]);
            }
        }
    }

    #[test]
    fn mlx90640_shape() {
        assert_eq!(GridShape::MLX90640.len(), 768);
        assert_eq!(GridShape::MLX90640.to_string(), "32x24");
    }

    #[test]
    fn wrong_length() {
        let shape = GridShape { rows: 2, cols: 2 };
        let result = reshape_frame(vec![20.0; 3], shape, SensorRange::MLX90640);
        assert_eq!(
            result.unwrap_err(),
            MalformedFrame::Length {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn not_a_number() {
        let shape = GridShape { rows: 1, cols: 3 };
        let result = reshape_frame(vec![20.0, f32::NAN, 20.0], shape, SensorRange::MLX90640);
        assert!(matches!(
            result,
            Err(MalformedFrame::Value { index: 1, .. })
        ));
    }

    #[test]
    fn out_of_range() {
        let shape = GridShape { rows: 1, cols: 3 };
        let result = reshape_frame(vec![20.0, 20.0, 512.0], shape, SensorRange::MLX90640);
        assert_eq!(
            result.unwrap_err(),
            MalformedFrame::Value {
                index: 2,
                value: 512.0
            }
        );
    }

    #[test]
    fn range_limits_inclusive() {
        let range = SensorRange::MLX90640;
        assert!(range.contains(-40.0));
        assert!(range.contains(300.0));
        assert!(!range.contains(f32::INFINITY));
    }
}

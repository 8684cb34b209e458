// SPDX-License-Identifier: GPL-3.0-or-later
//! Normalization and smoothing of temperature grids before they're colored.
use ndarray::Array2;

use crate::image_buffer::TemperatureGrid;

/// The upper end of the normalized range.
pub(crate) const NORMALIZED_MAX: f32 = 255.0;

/// The binomial approximation of a Gaussian with a 5 cell window (`[1, 4, 6, 4, 1] / 16`).
const GAUSSIAN_5: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];

/// Linearly rescale a grid so the coldest cell is 0 and the hottest is 255.
///
/// A grid where every cell has the same temperature has no range to stretch, so it's mapped to
/// all zeros.
pub(crate) fn normalize(grid: &TemperatureGrid) -> Array2<f32> {
    let (min, max) = grid
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), t| {
            (min.min(*t), max.max(*t))
        });
    let range = max - min;
    // Also catches empty grids, where the range is NaN
    if !(range > 0.0) {
        return Array2::zeros(grid.raw_dim());
    }
    // Dividing before scaling keeps the extremes exactly at 0 and 255.
    grid.mapv(|t| (t - min) / range * NORMALIZED_MAX)
}

/// Map an out-of-bounds index back into `0..len` by mirroring around the edge cells without
/// repeating them (`dcb|abcd|cba`).
fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len as isize - 1);
    let folded = index.rem_euclid(period);
    if folded >= len as isize {
        (period - folded) as usize
    } else {
        folded as usize
    }
}

/// Blur a grid with a 5x5 Gaussian kernel.
///
/// The kernel is separable, so this is done as a horizontal pass followed by a vertical one.
pub(crate) fn smooth(grid: &Array2<f32>) -> Array2<f32> {
    let (rows, cols) = grid.dim();
    let radius = (GAUSSIAN_5.len() / 2) as isize;
    let horizontal = Array2::from_shape_fn((rows, cols), |(row, col)| {
        GAUSSIAN_5
            .iter()
            .enumerate()
            .map(|(offset, weight)| {
                let source_col = reflect_101(col as isize + offset as isize - radius, cols);
                weight * grid[[row, source_col]]
            })
            .sum::<f32>()
    });
    Array2::from_shape_fn((rows, cols), |(row, col)| {
        GAUSSIAN_5
            .iter()
            .enumerate()
            .map(|(offset, weight)| {
                let source_row = reflect_101(row as isize + offset as isize - radius, rows);
                weight * horizontal[[source_row, col]]
            })
            .sum::<f32>()
    })
}

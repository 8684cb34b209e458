// SPDX-License-Identifier: GPL-3.0-or-later
mod acquirer;
mod i2c;
mod mlx90640;
mod mock_camera;
mod sample_source;
mod settings;

use acquirer::DEFAULT_MAX_ATTEMPTS;
pub(crate) use acquirer::FrameAcquirer;
pub(crate) use i2c::Bus;
#[cfg(test)]
pub(crate) use mock_camera::MockCamera;
pub(crate) use sample_source::SampleSource;
pub(crate) use settings::{CameraKind, CameraSettings, RefreshRate};

// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::TryFrom;
use std::fmt;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use linux_embedded_hal::I2cdev;
use serde::Deserialize;
use tracing::{debug, warn};

use super::i2c::Bus;
use super::mlx90640::Mlx90640;
use super::mock_camera::MockCamera;
use super::sample_source::SampleSource;

/// The refresh rates the sensor is allowed to run at.
///
/// Any other requested rate is quietly normalized to [`RefreshRate::Two`] instead of being
/// rejected.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(from = "i64")]
pub(crate) enum RefreshRate {
    Two,
    Four,
}

impl RefreshRate {
    pub(crate) fn hz(&self) -> u8 {
        match self {
            Self::Two => 2,
            Self::Four => 4,
        }
    }

    /// The time between frames at this refresh rate.
    pub(crate) fn frame_period(&self) -> Duration {
        Duration::from_secs(1) / u32::from(self.hz())
    }
}

impl Default for RefreshRate {
    fn default() -> Self {
        Self::Two
    }
}

impl From<i64> for RefreshRate {
    fn from(hz: i64) -> Self {
        match hz {
            2 => Self::Two,
            4 => Self::Four,
            _ => {
                warn!(requested = hz, "Unsupported refresh rate, using 2Hz instead");
                Self::Two
            }
        }
    }
}

impl From<RefreshRate> for mlx9064x::FrameRate {
    fn from(rate: RefreshRate) -> Self {
        match rate {
            RefreshRate::Two => mlx9064x::FrameRate::Two,
            RefreshRate::Four => mlx9064x::FrameRate::Four,
        }
    }
}

impl fmt::Display for RefreshRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz", self.hz())
    }
}

fn default_address() -> u8 {
    0x33
}

fn default_max_attempts() -> NonZeroU32 {
    NonZeroU32::new(super::DEFAULT_MAX_ATTEMPTS).expect("the default to be non-zero")
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub(crate) enum CameraKind {
    Mlx90640 {
        #[serde(default)]
        bus: Bus,

        #[serde(default = "default_address")]
        address: u8,
    },
    /// Play back frames recorded in a file instead of using real hardware.
    Mock { path: PathBuf },
}

impl Default for CameraKind {
    fn default() -> Self {
        Self::Mlx90640 {
            bus: Bus::default(),
            address: default_address(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct CameraSettings {
    #[serde(flatten)]
    pub(crate) kind: CameraKind,

    /// How many times reading a frame is attempted before the cycle is abandoned.
    #[serde(default = "default_max_attempts")]
    pub(crate) max_attempts: NonZeroU32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            kind: CameraKind::default(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl CameraSettings {
    /// Open the configured camera and set it to the given refresh rate.
    pub(crate) fn create_source(
        &self,
        refresh_rate: RefreshRate,
    ) -> anyhow::Result<Box<dyn SampleSource>> {
        Ok(match &self.kind {
            CameraKind::Mlx90640 { bus, address } => {
                debug!(%bus, address, "Opening MLX90640");
                let i2c_bus = I2cdev::try_from(bus)
                    .with_context(|| format!("Unable to open I2C bus {}", bus))?;
                let driver = mlx9064x::Mlx90640Driver::new(i2c_bus, *address)
                    .context("Unable to initialize MLX90640")?;
                Box::new(Mlx90640::new(driver, refresh_rate)?)
            }
            CameraKind::Mock { path } => {
                debug!(path = %path.display(), "Loading recorded frames");
                Box::new(MockCamera::from_path(path)?.with_refresh_rate(refresh_rate))
            }
        })
    }
}

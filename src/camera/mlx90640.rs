// SPDX-License-Identifier: GPL-3.0-or-later
use std::error::Error as StdError;
use std::fmt;
use std::thread::sleep as thread_sleep;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context as _};
use embedded_hal::blocking::i2c;
use tracing::{debug, trace};

use crate::error::SourceError;

use super::sample_source::{GridShape, SampleSource};
use super::settings::RefreshRate;

/// How many times per frame period the data-ready flag is checked.
const POLLS_PER_FRAME: u32 = 8;

/// A Melexis MLX90640 on an I2C bus.
pub(crate) struct Mlx90640<I2C> {
    camera: mlx9064x::Mlx90640Driver<I2C>,
    temperature_buffer: Vec<f32>,
    frame_period: Duration,
}

impl<I2C> Mlx90640<I2C>
where
    I2C: 'static + i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: 'static + StdError + Sync + Send,
    <I2C as i2c::Write>::Error: 'static + StdError + Sync + Send,
{
    pub(crate) fn new(
        mut camera: mlx9064x::Mlx90640Driver<I2C>,
        refresh_rate: RefreshRate,
    ) -> anyhow::Result<Self> {
        camera
            .set_frame_rate(refresh_rate.into())
            .context("Error setting camera frame rate")?;
        debug!(%refresh_rate, "Configured MLX90640 refresh rate");
        let num_pixels = camera.height() * camera.width();
        Ok(Self {
            camera,
            temperature_buffer: vec![0f32; num_pixels],
            frame_period: refresh_rate.frame_period(),
        })
    }
}

impl<I2C> fmt::Debug for Mlx90640<I2C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mlx90640")
            .field("frame_period", &self.frame_period)
            .finish()
    }
}

impl<I2C> SampleSource for Mlx90640<I2C>
where
    I2C: 'static + i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: 'static + StdError + Sync + Send,
    <I2C as i2c::Write>::Error: 'static + StdError + Sync + Send,
{
    fn shape(&self) -> GridShape {
        // mlx9064x uses row-major ordering, so the driver's dimensions map directly.
        GridShape {
            rows: self.camera.height(),
            cols: self.camera.width(),
        }
    }

    fn read_frame(&mut self) -> Result<Vec<f32>, SourceError> {
        // Give the camera two full frame periods to produce something before giving up.
        let deadline = Instant::now() + self.frame_period * 2;
        let poll_interval = self.frame_period / POLLS_PER_FRAME;
        loop {
            let ready = self
                .camera
                .generate_image_if_ready(&mut self.temperature_buffer)
                .context("Error reading frame from MLX90640")?;
            if ready {
                return Ok(self.temperature_buffer.clone());
            }
            if Instant::now() >= deadline {
                return Err(anyhow!(
                    "No new frame from the MLX90640 within {}ms",
                    (self.frame_period * 2).as_millis()
                )
                .into());
            }
            trace!("Frame not ready, waiting {}us", poll_interval.as_micros());
            thread_sleep(poll_interval);
        }
    }
}

#[cfg(test)]
mod test {
    use linux_embedded_hal::I2cdev;

    use crate::camera::SampleSource;

    use super::Mlx90640;

    fn assert_sample_source<S: SampleSource>() {}

    #[test]
    fn linux_bus_is_a_sample_source() {
        assert_sample_source::<Mlx90640<I2cdev>>();
    }
}

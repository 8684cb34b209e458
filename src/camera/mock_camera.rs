// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;
use std::path::Path;
use std::thread::sleep as thread_sleep;
use std::time::Duration;

use anyhow::{anyhow, ensure, Context as _};
use serde::Deserialize;
use tracing::trace;

use crate::error::{MalformedFrame, SourceError};

use super::sample_source::{GridShape, SampleSource};
use super::settings::RefreshRate;

/// Controls how frames are repeated by [`MockCamera`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RepeatMode {
    /// Don't repeat.
    ///
    /// Once the end of the recording has been reached, every read is a communication error.
    None,

    /// Loop over the frames. This is the default mode.
    Loop,

    /// Alternate between forward and reverse playback.
    ///
    /// The frames at either end of the recording are *not* repeated.
    Bounce,
}

impl Default for RepeatMode {
    fn default() -> Self {
        Self::Loop
    }
}

/// A failure to replay instead of a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RecordedError {
    Malformed,
    Communication,
}

/// A single entry in a recording.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RecordedFrame {
    /// Every cell has the same temperature.
    Uniform { uniform: f32 },

    /// The full list of cell temperatures, in row-major order.
    Values { values: Vec<f32> },

    /// Reading this frame fails.
    Error { error: RecordedError },
}

/// The on-disk format for recorded frames.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct Recording {
    rows: usize,
    cols: usize,

    #[serde(default)]
    repeat: RepeatMode,

    frames: Vec<RecordedFrame>,
}

/// A sample source that plays back a [`Recording`].
pub(crate) struct MockCamera {
    shape: GridShape,
    frames: Vec<RecordedFrame>,
    index: Box<dyn Iterator<Item = usize>>,
    frame_delay: Duration,
}

impl MockCamera {
    pub(crate) fn new(recording: Recording) -> anyhow::Result<Self> {
        let num_frames = recording.frames.len();
        ensure!(num_frames > 0, "A recording needs at least one frame");
        let index: Box<dyn Iterator<Item = usize>> = match recording.repeat {
            RepeatMode::None => Box::new(0..num_frames),
            RepeatMode::Loop => Box::new((0..num_frames).cycle()),
            RepeatMode::Bounce if num_frames < 3 => Box::new((0..num_frames).cycle()),
            RepeatMode::Bounce => {
                let forwards = 0..num_frames;
                let backwards = (1..(num_frames - 1)).rev();
                Box::new(forwards.chain(backwards).cycle())
            }
        };
        Ok(Self {
            shape: GridShape {
                rows: recording.rows,
                cols: recording.cols,
            },
            frames: recording.frames,
            index,
            frame_delay: Duration::ZERO,
        })
    }

    pub(crate) fn from_path(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read recording {}", path.display()))?;
        let recording: Recording = toml::from_str(&data)
            .with_context(|| format!("Unable to parse recording {}", path.display()))?;
        Self::new(recording)
    }

    /// Pace playback to match a real camera at the given refresh rate.
    pub(crate) fn with_refresh_rate(mut self, refresh_rate: RefreshRate) -> Self {
        self.frame_delay = refresh_rate.frame_period();
        self
    }
}

impl fmt::Debug for MockCamera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockCamera")
            .field("shape", &self.shape)
            .field("frames", &self.frames.len())
            .field("frame_delay", &self.frame_delay)
            .finish()
    }
}

impl SampleSource for MockCamera {
    fn shape(&self) -> GridShape {
        self.shape
    }

    fn read_frame(&mut self) -> Result<Vec<f32>, SourceError> {
        let index = self
            .index
            .next()
            .ok_or_else(|| anyhow!("No more frames in recording"))?;
        if self.frame_delay != Duration::ZERO {
            trace!("Waiting {}us for the next frame", self.frame_delay.as_micros());
            thread_sleep(self.frame_delay);
        }
        match &self.frames[index] {
            RecordedFrame::Uniform { uniform } => Ok(vec![*uniform; self.shape.len()]),
            RecordedFrame::Values { values } => Ok(values.clone()),
            RecordedFrame::Error {
                error: RecordedError::Malformed,
            } => Err(MalformedFrame::Value {
                index: 0,
                value: f32::NAN,
            }
            .into()),
            RecordedFrame::Error {
                error: RecordedError::Communication,
            } => Err(anyhow!("Recorded communication error at frame {}", index).into()),
        }
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use std::error::Error as StdError;
use std::fmt;

/// The ways a single frame read can be malformed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum MalformedFrame {
    /// The frame did not have the expected number of cells.
    Length { expected: usize, actual: usize },

    /// A cell was not a finite value within the sensor's measurement range.
    Value { index: usize, value: f32 },
}

impl fmt::Display for MalformedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { expected, actual } => write!(
                f,
                "expected {} temperature values, received {}",
                expected, actual
            ),
            Self::Value { index, value } => {
                write!(f, "temperature value {} at cell {} is out of range", value, index)
            }
        }
    }
}

/// An error from a single attempt at reading a frame from a sample source.
#[derive(Debug)]
pub(crate) enum SourceError {
    /// The frame was read, but the data in it is unusable. These are retried immediately.
    MalformedValue(MalformedFrame),

    /// The sensor could not be communicated with.
    Communication(anyhow::Error),
}

impl SourceError {
    pub(crate) fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedValue(_))
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedValue(malformed) => write!(f, "Malformed frame: {}", malformed),
            Self::Communication(err) => write!(f, "Sensor communication error: {}", err),
        }
    }
}

impl StdError for SourceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::MalformedValue(_) => None,
            Self::Communication(err) => Some(err.as_ref()),
        }
    }
}

impl From<MalformedFrame> for SourceError {
    fn from(malformed: MalformedFrame) -> Self {
        Self::MalformedValue(malformed)
    }
}

impl From<anyhow::Error> for SourceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Communication(err)
    }
}

/// Every attempt at reading a frame in a cycle failed.
#[derive(Debug)]
pub(crate) struct TerminalFailure {
    pub(crate) attempts: u32,
    pub(crate) last_error: SourceError,
}

impl fmt::Display for TerminalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unable to read a frame after {} attempts: {}",
            self.attempts, self.last_error
        )
    }
}

impl StdError for TerminalFailure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.last_error)
    }
}

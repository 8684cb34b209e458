// SPDX-License-Identifier: GPL-3.0-or-later
use std::num::NonZeroU32;

use tracing::{debug, trace, warn};

use crate::error::{SourceError, TerminalFailure};
use crate::image_buffer::TemperatureGrid;

use super::sample_source::{reshape_frame, SampleSource};

/// The number of read attempts per cycle unless configured otherwise.
pub(crate) const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// A successfully read frame.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Acquired {
    pub(crate) grid: TemperatureGrid,

    /// How many reads it took to get this frame, including the successful one.
    pub(crate) attempts: u32,
}

/// Reads frames from a [`SampleSource`], retrying failed reads up to a fixed budget.
#[derive(Debug)]
pub(crate) struct FrameAcquirer<S> {
    source: S,
    max_attempts: NonZeroU32,
}

impl<S> FrameAcquirer<S>
where
    S: SampleSource,
{
    pub(crate) fn new(source: S, max_attempts: NonZeroU32) -> Self {
        Self {
            source,
            max_attempts,
        }
    }

    /// Read and validate a single frame.
    ///
    /// Malformed frames and communication errors both count against the attempt budget. Once the
    /// budget is spent the last error is returned.
    pub(crate) fn acquire(&mut self) -> Result<Acquired, TerminalFailure> {
        let shape = self.source.shape();
        let range = self.source.range();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let result = self
                .source
                .read_frame()
                .and_then(|raw| reshape_frame(raw, shape, range).map_err(SourceError::from));
            let error = match result {
                Ok(grid) => {
                    trace!(attempts, "Acquired frame");
                    return Ok(Acquired { grid, attempts });
                }
                Err(error) => error,
            };
            if attempts >= self.max_attempts.get() {
                return Err(TerminalFailure {
                    attempts,
                    last_error: error,
                });
            }
            if error.is_malformed() {
                debug!(attempts, %error, "Discarding malformed frame");
            } else {
                warn!(attempts, %error, "Retrying frame read");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::num::NonZeroU32;
    use std::rc::Rc;

    use anyhow::anyhow;

    use crate::camera::sample_source::{GridShape, SampleSource};
    use crate::error::{MalformedFrame, SourceError};

    use super::{FrameAcquirer, DEFAULT_MAX_ATTEMPTS};

    const SHAPE: GridShape = GridShape::MLX90640;

    #[derive(Debug)]
    enum Scripted {
        Frame(Vec<f32>),
        Malformed,
        Communication,
    }

    /// A sample source that replays a fixed script, then fails with communication errors.
    #[derive(Debug)]
    struct ScriptedSource {
        script: VecDeque<Scripted>,
        reads: Rc<Cell<u32>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Scripted>) -> (Self, Rc<Cell<u32>>) {
            let reads = Rc::new(Cell::new(0));
            let source = Self {
                script: script.into(),
                reads: Rc::clone(&reads),
            };
            (source, reads)
        }
    }

    impl SampleSource for ScriptedSource {
        fn shape(&self) -> GridShape {
            SHAPE
        }

        fn read_frame(&mut self) -> Result<Vec<f32>, SourceError> {
            self.reads.set(self.reads.get() + 1);
            match self.script.pop_front() {
                Some(Scripted::Frame(values)) => Ok(values),
                Some(Scripted::Malformed) => Err(MalformedFrame::Value {
                    index: 3,
                    value: f32::NAN,
                }
                .into()),
                Some(Scripted::Communication) | None => Err(anyhow!("I2C read timed out").into()),
            }
        }
    }

    fn default_attempts() -> NonZeroU32 {
        NonZeroU32::new(DEFAULT_MAX_ATTEMPTS).unwrap()
    }

    #[test]
    fn first_read_succeeds() {
        let (source, reads) = ScriptedSource::new(vec![Scripted::Frame(vec![22.0; 768])]);
        let mut acquirer = FrameAcquirer::new(source, default_attempts());
        let acquired = acquirer.acquire().expect("the first frame to be read");
        assert_eq!(acquired.attempts, 1);
        assert_eq!(acquired.grid.dim(), (24, 32));
        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn communication_errors_exhaust_budget() {
        let (source, reads) = ScriptedSource::new(vec![]);
        let mut acquirer = FrameAcquirer::new(source, default_attempts());
        let failure = acquirer.acquire().expect_err("every read to fail");
        assert_eq!(failure.attempts, 5);
        assert_eq!(reads.get(), 5);
        assert!(matches!(failure.last_error, SourceError::Communication(_)));
    }

    #[test]
    fn malformed_then_success() {
        let (source, reads) = ScriptedSource::new(vec![
            Scripted::Malformed,
            Scripted::Malformed,
            Scripted::Frame(vec![30.0; 768]),
        ]);
        let mut acquirer = FrameAcquirer::new(source, default_attempts());
        let acquired = acquirer.acquire().expect("the third frame to be read");
        assert_eq!(acquired.attempts, 3);
        assert_eq!(reads.get(), 3);
        assert!(acquired.grid.iter().all(|t| *t == 30.0));
    }

    #[test]
    fn malformed_errors_exhaust_budget() {
        let script = (0..DEFAULT_MAX_ATTEMPTS).map(|_| Scripted::Malformed).collect();
        let (source, reads) = ScriptedSource::new(script);
        let mut acquirer = FrameAcquirer::new(source, default_attempts());
        let failure = acquirer.acquire().expect_err("every read to be malformed");
        assert_eq!(failure.attempts, 5);
        assert_eq!(reads.get(), 5);
        assert!(failure.last_error.is_malformed());
    }

    #[test]
    fn invalid_values_are_malformed() {
        let mut bad_frame = vec![25.0; 768];
        bad_frame[100] = 9000.0;
        let (source, reads) = ScriptedSource::new(vec![
            Scripted::Frame(vec![25.0; 12]),
            Scripted::Frame(bad_frame),
            Scripted::Frame(vec![25.0; 768]),
        ]);
        let mut acquirer = FrameAcquirer::new(source, default_attempts());
        let acquired = acquirer.acquire().expect("the third frame to be valid");
        assert_eq!(acquired.attempts, 3);
        assert_eq!(reads.get(), 3);
    }

    #[test]
    fn custom_budget() {
        let (source, reads) = ScriptedSource::new(vec![Scripted::Communication]);
        let mut acquirer = FrameAcquirer::new(source, NonZeroU32::new(1).unwrap());
        let failure = acquirer.acquire().expect_err("the only read to fail");
        assert_eq!(failure.attempts, 1);
        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn budget_resets_each_cycle() {
        let (source, reads) = ScriptedSource::new(vec![
            Scripted::Communication,
            Scripted::Communication,
            Scripted::Frame(vec![21.0; 768]),
            Scripted::Communication,
            Scripted::Frame(vec![21.0; 768]),
        ]);
        let mut acquirer = FrameAcquirer::new(source, default_attempts());
        assert_eq!(acquirer.acquire().unwrap().attempts, 3);
        assert_eq!(acquirer.acquire().unwrap().attempts, 2);
        assert_eq!(reads.get(), 5);
    }
}

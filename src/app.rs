// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::mpsc;

use anyhow::Context as _;
use chrono::{Local, NaiveDateTime};
use tracing::{debug, error, info, warn};

use crate::camera::{FrameAcquirer, SampleSource};
use crate::capture::CaptureSettings;
use crate::command::Command;
use crate::display::{Display, Window};
use crate::pipeline::{FrameProcessor, ProcessedFrame};
use crate::settings::{Settings, ThresholdConfig};

/// Whether the main loop keeps going after handling commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// The main loop: read a frame, process it, show it, then handle any commands.
#[derive(Debug)]
pub(crate) struct App {
    acquirer: FrameAcquirer<Box<dyn SampleSource>>,
    processor: FrameProcessor,
    display: Box<dyn Display>,
    capture: CaptureSettings,
    commands: mpsc::Receiver<Command>,
}

impl App {
    pub(crate) fn new(
        acquirer: FrameAcquirer<Box<dyn SampleSource>>,
        processor: FrameProcessor,
        display: Box<dyn Display>,
        capture: CaptureSettings,
        commands: mpsc::Receiver<Command>,
    ) -> Self {
        Self {
            acquirer,
            processor,
            display,
            capture,
            commands,
        }
    }

    /// Set up the camera, renderer, and display. Any failure here is fatal.
    pub(crate) fn from_settings(
        settings: &Settings,
        thresholds: ThresholdConfig,
        commands: mpsc::Receiver<Command>,
    ) -> anyhow::Result<Self> {
        let source = settings
            .camera
            .create_source(thresholds.refresh_rate)
            .context("Unable to set up the camera")?;
        let acquirer = FrameAcquirer::new(source, settings.camera.max_attempts);
        let processor = FrameProcessor::from_settings(&settings.render, thresholds)
            .context("Unable to set up rendering")?;
        let display = settings
            .display
            .create_display()
            .context("Unable to set up the display")?;
        Ok(Self::new(
            acquirer,
            processor,
            display,
            settings.capture.clone(),
            commands,
        ))
    }

    /// Run until a quit command is received.
    pub(crate) fn run(mut self) -> anyhow::Result<()> {
        let thresholds = self.processor.thresholds();
        info!(
            max_temp = thresholds.max_temp.in_celsius(),
            min_temp = thresholds.min_temp.in_celsius(),
            refresh_rate = %thresholds.refresh_rate,
            "Starting monitor, enter 'p' to take a snapshot or 'q' to quit"
        );
        let result = self.run_until_quit();
        info!("Quitting");
        let closed = self.display.close();
        // A failure from the loop is more interesting than one from closing the display.
        result.and(closed)
    }

    fn run_until_quit(&mut self) -> anyhow::Result<()> {
        loop {
            let frame = self.cycle()?;
            if self.handle_commands(frame.as_ref()) == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Read, process, and show a single frame.
    ///
    /// A frame that can't be read (or processed) is logged and skipped. Only display errors end
    /// the loop.
    fn cycle(&mut self) -> anyhow::Result<Option<ProcessedFrame>> {
        let acquired = match self.acquirer.acquire() {
            Ok(acquired) => acquired,
            Err(failure) => {
                error!(attempts = failure.attempts, error = %failure, "Skipping frame");
                return Ok(None);
            }
        };
        if acquired.attempts > 1 {
            debug!(attempts = acquired.attempts, "Frame needed retries");
        }
        let frame = match self.processor.process(&acquired.grid) {
            Ok(frame) => frame,
            Err(err) => {
                error!(error = ?err, "Unable to process frame");
                return Ok(None);
            }
        };
        self.display
            .show(Window::Live, &frame.image)
            .with_context(|| format!("Unable to show the {} window", Window::Live))?;
        Ok(Some(frame))
    }

    /// Handle every command received since the last cycle, in order.
    fn handle_commands(&mut self, frame: Option<&ProcessedFrame>) -> Flow {
        let mut flow = Flow::Continue;
        // Collected first so the receiver isn't borrowed while taking snapshots.
        let pending: Vec<Command> = self.commands.try_iter().collect();
        for command in pending {
            match command {
                Command::Quit => flow = Flow::Quit,
                Command::Snapshot => match frame {
                    Some(frame) => {
                        let timestamp = Local::now().naive_local();
                        if let Err(err) = self.snapshot(frame, &timestamp) {
                            error!(error = ?err, "Unable to take snapshot");
                        }
                    }
                    None => warn!("No frame to take a snapshot of"),
                },
            }
        }
        flow
    }

    fn snapshot(
        &mut self,
        frame: &ProcessedFrame,
        timestamp: &NaiveDateTime,
    ) -> anyhow::Result<()> {
        let snapshot = self.capture.save(&frame.image, timestamp)?;
        let captured = self.processor.capture_image(frame, &snapshot.file_name)?;
        debug!(path = %snapshot.path.display(), "Showing snapshot");
        self.display.show(Window::Capture, &captured)
    }
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::num::NonZeroU32;
    use std::path::Path;
    use std::sync::mpsc;

    use crate::camera::{FrameAcquirer, MockCamera, RefreshRate, SampleSource};
    use crate::capture::CaptureSettings;
    use crate::command::Command;
    use crate::display::{Display, PreviewDirectory, Window};
    use crate::image_buffer::ColorImage;
    use crate::pipeline::FrameProcessor;
    use crate::render::RenderSettings;
    use crate::settings::ThresholdConfig;
    use crate::temperature::Temperature;

    use super::App;

    const RECORDING: &str = r#"
    rows = 24
    cols = 32

    [[frames]]
    error = "communication"

    [[frames]]
    uniform = 25.0

    [[frames]]
    uniform = 35.0
    "#;

    fn thresholds() -> ThresholdConfig {
        ThresholdConfig {
            max_temp: Temperature::Celsius(30.0),
            min_temp: Temperature::Celsius(10.0),
            refresh_rate: RefreshRate::Two,
        }
    }

    fn mock_source(dir: &Path) -> Box<dyn SampleSource> {
        let path = dir.join("recording.toml");
        fs::write(&path, RECORDING).unwrap();
        // Created directly instead of through CameraSettings to skip the frame pacing.
        Box::new(MockCamera::from_path(&path).unwrap())
    }

    fn app(dir: &Path, commands: mpsc::Receiver<Command>) -> App {
        let acquirer = FrameAcquirer::new(mock_source(dir), NonZeroU32::new(5).unwrap());
        let processor =
            FrameProcessor::from_settings(&RenderSettings::default(), thresholds()).unwrap();
        let display: Box<dyn Display> =
            Box::new(PreviewDirectory::new(&dir.join("preview")).unwrap());
        let capture = CaptureSettings {
            directory: dir.join("captures"),
            ..CaptureSettings::default()
        };
        fs::create_dir(&capture.directory).unwrap();
        App::new(acquirer, processor, display, capture, commands)
    }

    fn captures(dir: &Path) -> Vec<String> {
        fs::read_dir(dir.join("captures"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn quit_after_first_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let (sender, receiver) = mpsc::channel();
        sender.send(Command::Quit).unwrap();
        app(dir.path(), receiver).run().unwrap();
        assert!(captures(dir.path()).is_empty());
        // Closing the display removes the previews.
        assert!(!dir.path().join("preview").join("live.png").exists());
    }

    #[test]
    fn snapshot_then_quit() {
        let dir = tempfile::tempdir().unwrap();
        let (sender, receiver) = mpsc::channel();
        sender.send(Command::Snapshot).unwrap();
        sender.send(Command::Quit).unwrap();
        app(dir.path(), receiver).run().unwrap();
        let captures = captures(dir.path());
        assert_eq!(captures.len(), 1, "{:?}", captures);
        assert!(captures[0].ends_with(".png"));
    }

    #[test]
    fn cycles_until_frame_available() {
        let dir = tempfile::tempdir().unwrap();
        let (_sender, receiver) = mpsc::channel();
        let mut app = app(dir.path(), receiver);
        // The recorded communication error is retried within the cycle.
        let frame = app.cycle().unwrap().expect("a frame after one retry");
        assert_eq!(frame.evaluation.mean, 25.0);
        assert!(dir.path().join("preview").join("live.png").exists());
        let frame = app.cycle().unwrap().expect("the next recorded frame");
        assert_eq!(frame.labels.len(), 2);
    }

    #[test]
    fn snapshot_without_frame() {
        let dir = tempfile::tempdir().unwrap();
        let (sender, receiver) = mpsc::channel();
        sender.send(Command::Snapshot).unwrap();
        let mut app = app(dir.path(), receiver);
        assert_eq!(app.handle_commands(None), super::Flow::Continue);
        assert!(captures(dir.path()).is_empty());
    }

    /// Writes the first image, then fails on every later one.
    #[derive(Debug)]
    struct FailingDisplay {
        preview: PreviewDirectory,
    }

    impl Display for FailingDisplay {
        fn show(&mut self, window: Window, image: &ColorImage) -> anyhow::Result<()> {
            if self.preview.path(Window::Live).exists() {
                anyhow::bail!("display went away");
            }
            self.preview.show(window, image)
        }

        fn close(&mut self) -> anyhow::Result<()> {
            self.preview.close()
        }
    }

    #[test]
    fn display_error_still_closes() {
        let dir = tempfile::tempdir().unwrap();
        let (_sender, receiver) = mpsc::channel();
        let mut app = app(dir.path(), receiver);
        app.display = Box::new(FailingDisplay {
            preview: PreviewDirectory::new(&dir.path().join("preview")).unwrap(),
        });
        assert!(app.run().is_err());
        assert!(!dir.path().join("preview").join("live.png").exists());
    }

    #[test]
    fn failed_snapshot_keeps_running() {
        let dir = tempfile::tempdir().unwrap();
        let (sender, receiver) = mpsc::channel();
        let mut app = app(dir.path(), receiver);
        fs::remove_dir(dir.path().join("captures")).unwrap();
        let frame = app.cycle().unwrap();
        sender.send(Command::Snapshot).unwrap();
        assert_eq!(app.handle_commands(frame.as_ref()), super::Flow::Continue);
    }
}

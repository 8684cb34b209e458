// SPDX-License-Identifier: GPL-3.0-or-later
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tracing::debug;

mod cli;
mod thresholds;

use crate::camera::{CameraKind, CameraSettings, RefreshRate};
use crate::capture::CaptureSettings;
use crate::display::DisplaySettings;
use crate::render::RenderSettings;
use crate::temperature::Temperature;
pub(crate) use cli::Args;
pub(crate) use thresholds::{ThresholdConfig, ThresholdSettings};

/// The config file used when none is given on the command line, if it exists.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct Settings {
    /// Alert limits and the camera refresh rate.
    #[serde(default)]
    pub(crate) thresholds: ThresholdSettings,

    /// Camera-specific settings.
    #[serde(default)]
    pub(crate) camera: CameraSettings,

    /// Settings related to how the data is rendered.
    #[serde(default)]
    pub(crate) render: RenderSettings,

    /// Where and how snapshots are saved.
    #[serde(default)]
    pub(crate) capture: CaptureSettings,

    /// Where images are shown.
    #[serde(default)]
    pub(crate) display: DisplaySettings,
}

impl Settings {
    pub(crate) fn from_path(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file {}", path.display()))?;
        toml::from_str(&data)
            .with_context(|| format!("Unable to parse config file {}", path.display()))
    }

    /// Load the config file (if there is one), then apply overrides from the command line.
    pub(crate) fn load(args: &Args) -> anyhow::Result<Self> {
        let config_path = match &args.config_path {
            Some(path) => Some(path.clone()),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Some(default_path)
                } else {
                    None
                }
            }
        };
        let mut settings = match config_path {
            Some(path) => {
                debug!(path = %path.display(), "Loading config file");
                Self::from_path(&path)?
            }
            None => {
                debug!("No config file, using the defaults");
                Self::default()
            }
        };
        settings.apply_args(args);
        Ok(settings)
    }

    /// Command line values take precedence over the config file.
    fn apply_args(&mut self, args: &Args) {
        if let Some(max_temp) = args.max_temp {
            self.thresholds.max_temp = Some(Temperature::Celsius(max_temp as f32));
        }
        if let Some(min_temp) = args.min_temp {
            self.thresholds.min_temp = Some(Temperature::Celsius(min_temp as f32));
        }
        if let Some(refresh_rate) = args.refresh_rate {
            self.thresholds.refresh_rate = Some(RefreshRate::from(refresh_rate));
        }
        if let Some(new_bus) = &args.bus {
            match &mut self.camera.kind {
                CameraKind::Mlx90640 { bus, .. } => *bus = new_bus.clone(),
                CameraKind::Mock { .. } => {
                    debug!(bus = %new_bus, "Ignoring I2C bus for a mock camera")
                }
            }
        }
        if let Some(path) = &args.mock {
            self.camera.kind = CameraKind::Mock { path: path.clone() };
        }
        if let Some(directory) = &args.capture_dir {
            self.capture.directory = directory.clone();
        }
        if let Some(directory) = &args.preview_dir {
            self.display.preview_dir = Some(directory.clone());
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;
    use std::path::PathBuf;

    use structopt::StructOpt;

    use crate::camera::{Bus, CameraKind, RefreshRate};
    use crate::render::ColorMap;
    use crate::temperature::Temperature;

    use super::{Args, Settings};

    fn args(arguments: &[&str]) -> Args {
        let mut full = vec!["thermal-monitor"];
        full.extend_from_slice(arguments);
        Args::from_iter_safe(&full).unwrap()
    }

    #[test]
    fn empty_config() {
        let parsed: Result<Settings, _> = toml::from_str("");
        assert!(
            parsed.is_ok(),
            "Failed to parse empty TOML: {}",
            parsed.unwrap_err()
        );
        assert_eq!(parsed.unwrap(), Settings::default());
    }

    #[test]
    fn full_config() {
        let source = r#"
        [thresholds]
        max_temp = 30
        min_temp = 10
        refresh_rate = 4

        [camera]
        kind = "mlx90640"
        bus = "/dev/i2c-2"
        address = 0x34
        max_attempts = 3

        [render]
        colors = "inferno"
        scaling_method = "nearest"

        [capture]
        directory = "/var/lib/thermal"
        timestamp_format = "%Y%m%d-%H%M%S"

        [display]
        preview_dir = "/tmp/thermal"
        "#;
        let parsed: Result<Settings, _> = toml::from_str(source);
        assert!(
            parsed.is_ok(),
            "Failed to parse full config: {}",
            parsed.unwrap_err()
        );
        let parsed = parsed.unwrap();
        assert_eq!(parsed.thresholds.max_temp, Some(Temperature::Celsius(30.0)));
        assert_eq!(parsed.thresholds.min_temp, Some(Temperature::Celsius(10.0)));
        assert_eq!(parsed.thresholds.refresh_rate, Some(RefreshRate::Four));
        assert_eq!(
            parsed.camera.kind,
            CameraKind::Mlx90640 {
                bus: Bus::Path(PathBuf::from("/dev/i2c-2")),
                address: 0x34,
            }
        );
        assert_eq!(parsed.camera.max_attempts.get(), 3);
        assert_eq!(parsed.render.colors, ColorMap::Gradient(colorous::INFERNO));
        assert_eq!(parsed.capture.directory, PathBuf::from("/var/lib/thermal"));
        assert_eq!(parsed.capture.timestamp_format, "%Y%m%d-%H%M%S");
        assert_eq!(
            parsed.display.preview_dir,
            Some(PathBuf::from("/tmp/thermal"))
        );
    }

    #[test]
    fn example_config() {
        let parsed: Result<Settings, _> = toml::from_str(include_str!("../../config_example.toml"));
        assert!(
            parsed.is_ok(),
            "Failed to parse the example config: {}",
            parsed.unwrap_err()
        );
        let parsed = parsed.unwrap();
        assert_eq!(parsed.thresholds.refresh_rate, Some(RefreshRate::Two));
        assert_eq!(parsed.render.colors, ColorMap::Jet);
        assert_eq!(parsed.display.preview_dir, None);
    }

    #[test]
    fn bad_timestamp_format() {
        let parsed: Result<Settings, _> =
            toml::from_str("[capture]\ntimestamp_format = \"%H-%M-%!\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn command_line_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[thresholds]\nmax_temp = 30\nmin_temp = 10\nrefresh_rate = 4"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let settings = Settings::load(&args(&[
            "-c",
            &path,
            "--max-temp",
            "45",
            "--refresh-rate",
            "7",
            "--capture-dir",
            "/srv/captures",
        ]))
        .unwrap();
        assert_eq!(
            settings.thresholds.max_temp,
            Some(Temperature::Celsius(45.0))
        );
        // Not given on the command line, so the file's value is kept.
        assert_eq!(
            settings.thresholds.min_temp,
            Some(Temperature::Celsius(10.0))
        );
        assert_eq!(settings.thresholds.refresh_rate, Some(RefreshRate::Two));
        assert_eq!(settings.capture.directory, PathBuf::from("/srv/captures"));
    }

    #[test]
    fn mock_from_command_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[camera]\nkind = \"mlx90640\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let settings =
            Settings::load(&args(&["-c", &path, "--mock", "frames.toml"])).unwrap();
        assert_eq!(
            settings.camera.kind,
            CameraKind::Mock {
                path: PathBuf::from("frames.toml")
            }
        );
    }

    #[test]
    fn bus_from_command_line() {
        let settings = Settings::load(&args(&["--bus", "0"])).unwrap();
        assert_eq!(
            settings.camera.kind,
            CameraKind::Mlx90640 {
                bus: Bus::Number(0),
                address: 0x33,
            }
        );
    }

    #[test]
    fn missing_config_file() {
        assert!(Settings::load(&args(&["-c", "/nonexistent/thermal.toml"])).is_err());
    }
}

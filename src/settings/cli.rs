// SPDX-License-Identifier: GPL-3.0-or-later
use structopt::StructOpt;

use std::path::PathBuf;

use crate::camera::Bus;

/// Show a live thermal image from an MLX90640, and raise alerts when the mean temperature leaves
/// the configured range.
#[derive(Debug, StructOpt)]
#[structopt()]
pub(crate) struct Args {
    /// Path to a configuration file. Defaults to config.toml if that file exists.
    #[structopt(short, long, parse(from_os_str))]
    pub(crate) config_path: Option<PathBuf>,

    /// Show the maximum temperature alert when the mean rises above this (in Celsius).
    #[structopt(long, allow_hyphen_values = true)]
    pub(crate) max_temp: Option<i32>,

    /// Show the minimum temperature alert when the mean drops below this (in Celsius).
    #[structopt(long, allow_hyphen_values = true)]
    pub(crate) min_temp: Option<i32>,

    /// Camera refresh rate in Hz, either 2 or 4. Anything else falls back to 2.
    #[structopt(short, long)]
    pub(crate) refresh_rate: Option<i64>,

    /// The I2C bus the camera is on, either as a bus number or a device path.
    #[structopt(long)]
    pub(crate) bus: Option<Bus>,

    /// Play back a recording instead of reading from the camera.
    #[structopt(long, parse(from_os_str))]
    pub(crate) mock: Option<PathBuf>,

    /// Directory snapshots are saved in.
    #[structopt(long, parse(from_os_str))]
    pub(crate) capture_dir: Option<PathBuf>,

    /// Write the live and captured images into this directory for viewing.
    #[structopt(long, parse(from_os_str))]
    pub(crate) preview_dir: Option<PathBuf>,

    /// Log more details. Can be given twice.
    #[structopt(short, long, parse(from_occurrences))]
    pub(crate) verbose: u8,
}

// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use image::ImageFormat;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::{info, warn};

use crate::image_buffer::ColorImage;

pub(crate) const DEFAULT_TIMESTAMP_FORMAT: &str = "%H-%M-%S_%d-%m-%Y";

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

/// Check that a strftime format string is usable for file names.
pub(crate) fn validate_timestamp_format(format: &str) -> Result<(), String> {
    if format.is_empty() {
        return Err("the timestamp format is empty".to_string());
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(format!("'{}' is not a valid strftime format", format));
    }
    if format.contains(std::path::is_separator) {
        return Err(format!(
            "'{}' contains a path separator, snapshot names can't include directories",
            format
        ));
    }
    if format.contains(':') {
        warn!(
            format,
            "Snapshot names with ':' can't be stored on every filesystem"
        );
    }
    Ok(())
}

fn deserialize_timestamp_format<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let format: String = Deserialize::deserialize(deserializer)?;
    validate_timestamp_format(&format).map_err(de::Error::custom)?;
    Ok(format)
}

/// A saved snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub(crate) file_name: String,
    pub(crate) path: PathBuf,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct CaptureSettings {
    /// Directory snapshots are written to.
    #[serde(default = "default_directory")]
    pub(crate) directory: PathBuf,

    /// A strftime format for the local time, used as the snapshot file name.
    #[serde(
        default = "default_timestamp_format",
        deserialize_with = "deserialize_timestamp_format"
    )]
    pub(crate) timestamp_format: String,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl CaptureSettings {
    pub(crate) fn file_name(&self, timestamp: &NaiveDateTime) -> String {
        format!("{}.png", timestamp.format(&self.timestamp_format))
    }

    /// Write an image as a PNG named after the timestamp.
    pub(crate) fn save(
        &self,
        image: &ColorImage,
        timestamp: &NaiveDateTime,
    ) -> anyhow::Result<Snapshot> {
        let file_name = self.file_name(timestamp);
        let path = self.directory.join(&file_name);
        write_png(image, &path)?;
        info!(path = %path.display(), "Saved snapshot");
        Ok(Snapshot { file_name, path })
    }
}

pub(crate) fn write_png(image: &ColorImage, path: &Path) -> anyhow::Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Unable to write {}", path.display()))
}

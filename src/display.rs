// SPDX-License-Identifier: GPL-3.0-or-later
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use tracing::{debug, info, trace};

use crate::capture::write_png;
use crate::image_buffer::ColorImage;

/// The windows images can be shown in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Window {
    /// The annotated image for the most recent frame.
    Live,

    /// The most recent snapshot.
    Capture,
}

impl Window {
    pub(crate) fn title(&self) -> &'static str {
        match self {
            Self::Live => "Thermal image",
            Self::Capture => "Captured thermal image",
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            Self::Live => "live.png",
            Self::Capture => "capture.png",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Somewhere to show images.
pub(crate) trait Display: fmt::Debug {
    /// Replace the contents of a window with an image.
    fn show(&mut self, window: Window, image: &ColorImage) -> anyhow::Result<()>;

    /// Tear down every window.
    fn close(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A display that only logs what would have been shown.
#[derive(Debug, Default)]
pub(crate) struct Headless {
    shown: u64,
}

impl Display for Headless {
    fn show(&mut self, window: Window, image: &ColorImage) -> anyhow::Result<()> {
        self.shown += 1;
        trace!(
            %window,
            width = image.width(),
            height = image.height(),
            shown = self.shown,
            "Discarding image"
        );
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        debug!(shown = self.shown, "Closed headless display");
        Ok(())
    }
}

/// A display that keeps the latest image for each window as a PNG in a directory, so they can
/// be watched with any image viewer.
#[derive(Debug)]
pub(crate) struct PreviewDirectory {
    directory: PathBuf,
    written: BTreeSet<Window>,
}

impl PreviewDirectory {
    pub(crate) fn new(directory: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(directory).with_context(|| {
            format!("Unable to create preview directory {}", directory.display())
        })?;
        info!(directory = %directory.display(), "Writing previews");
        Ok(Self {
            directory: directory.to_path_buf(),
            written: BTreeSet::new(),
        })
    }

    pub(crate) fn path(&self, window: Window) -> PathBuf {
        self.directory.join(window.file_name())
    }
}

impl Display for PreviewDirectory {
    fn show(&mut self, window: Window, image: &ColorImage) -> anyhow::Result<()> {
        let path = self.path(window);
        // Write to a temporary file first so viewers never load a partial image.
        let partial_path = self.directory.join(format!(".{}.partial", window.file_name()));
        write_png(image, &partial_path)?;
        fs::rename(&partial_path, &path)
            .with_context(|| format!("Unable to replace {}", path.display()))?;
        self.written.insert(window);
        trace!(%window, path = %path.display(), "Updated preview");
        Ok(())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        for window in std::mem::take(&mut self.written) {
            let path = self.path(window);
            fs::remove_file(&path)
                .with_context(|| format!("Unable to remove {}", path.display()))?;
        }
        debug!(directory = %self.directory.display(), "Removed previews");
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct DisplaySettings {
    /// Write previews to this directory. Without it, images aren't shown anywhere.
    #[serde(default)]
    pub(crate) preview_dir: Option<PathBuf>,
}

impl DisplaySettings {
    pub(crate) fn create_display(&self) -> anyhow::Result<Box<dyn Display>> {
        match &self.preview_dir {
            Some(directory) => Ok(Box::new(PreviewDirectory::new(directory)?)),
            None => {
                info!("No preview directory configured, running headless");
                Ok(Box::new(Headless::default()))
            }
        }
    }
}

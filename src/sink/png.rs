use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::debug;

use super::FrameSink;
use crate::frame::Frame;

/// Writes each frame to `<dir>/frame_00000.png`, `frame_00001.png`, ...
pub struct PngSequenceSink {
    dir: PathBuf,
    index: u64,
}

impl PngSequenceSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        Ok(Self { dir, index: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> u64 {
        self.index
    }
}

impl FrameSink for PngSequenceSink {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        let path = self.dir.join(format!("frame_{:05}.png", self.index));
        frame
            .as_image()
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        debug!(path = %path.display(), "wrote frame");
        self.index += 1;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "png"
    }
}

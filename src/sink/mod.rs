mod pixelflut;
mod png;

pub use pixelflut::{PixelflutConfig, PixelflutSink};
pub use png::PngSequenceSink;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;

use crate::frame::Frame;

/// Consumes transformed frames: a display, a file writer, a recorder.
pub trait FrameSink {
    fn present(&mut self, frame: &Frame) -> Result<()>;

    /// Called once after the last frame.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}

/// Keeps every presented frame, for tests and debugging.
///
/// Clones share the same storage, so a clone kept outside a pipeline sees
/// what the pipeline presented.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Captured>>,
}

#[derive(Debug, Default)]
struct Captured {
    frames: Vec<Frame>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn captured(&self) -> MutexGuard<'_, Captured> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.captured().frames.clone()
    }

    pub fn len(&self) -> usize {
        self.captured().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_finished(&self) -> bool {
        self.captured().finished
    }
}

impl FrameSink for MemorySink {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.captured().frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.captured().finished = true;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

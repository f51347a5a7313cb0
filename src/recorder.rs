//! Records presented frames into a video file through the system `ffmpeg`.
//!
//! The recorder is a [`FrameSink`]: once started it encodes every frame it is
//! shown, and stopping hands the finished file's path to a callback.

use std::{
    io::Write,
    path::{Path, PathBuf},
    process::ChildStdin,
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, bail, Context, Result};
use ffmpeg_sidecar::{
    child::FfmpegChild,
    command::FfmpegCommand,
    event::{FfmpegEvent, LogLevel},
};
use tracing::{debug, info, warn};

use crate::{error::Error, frame::Frame, sink::FrameSink};

enum State {
    Idle,
    /// Started, waiting for the first frame to learn the size.
    Armed,
    Recording(Encoder),
}

struct Encoder {
    child: FfmpegChild,
    stdin: ChildStdin,
    diagnostics: JoinHandle<()>,
    dimensions: (u32, u32),
    frames: u64,
}

pub struct Recorder {
    path: PathBuf,
    fps: u32,
    state: State,
}

impl Recorder {
    pub fn new(path: impl Into<PathBuf>, fps: u32) -> Self {
        Self {
            path: path.into(),
            fps: fps.max(1),
            state: State::Idle,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_recording(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    /// Starts capturing; the encoder spawns on the next presented frame.
    pub fn start(&mut self) {
        if self.is_recording() {
            warn!(path = %self.path.display(), "recorder already started");
            return;
        }
        debug!(path = %self.path.display(), "recorder armed");
        self.state = State::Armed;
    }

    /// Stops capturing and finalizes the file, then calls `callback` with
    /// its path. If no frame arrived since `start`, nothing is written and the
    /// callback is not called.
    pub fn stop(&mut self, callback: impl FnOnce(&Path)) -> Result<()> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => Ok(()),
            State::Armed => {
                info!("recorder stopped before any frame arrived");
                Ok(())
            }
            State::Recording(encoder) => {
                let frames = encoder.frames;
                encoder.finish()?;
                info!(frames, path = %self.path.display(), "recording finished");
                callback(&self.path);
                Ok(())
            }
        }
    }

    fn spawn_encoder(&self, dimensions: (u32, u32)) -> Result<Encoder> {
        let (width, height) = dimensions;
        let size = format!("{width}x{height}");
        let rate = self.fps.to_string();

        let mut child = FfmpegCommand::new()
            .hide_banner()
            .overwrite()
            .args(["-f", "rawvideo", "-pix_fmt", "rgba"])
            .args(["-s", size.as_str(), "-r", rate.as_str()])
            .input("-")
            // yuv420p needs even dimensions
            .args(["-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2", "-pix_fmt", "yuv420p"])
            .output(self.path.as_os_str())
            .spawn()
            .context("starting ffmpeg encoder")?;

        let stdin = child
            .take_stdin()
            .ok_or_else(|| anyhow!("ffmpeg encoder has no stdin"))?;

        let events = child.iter()?;
        let diagnostics = thread::Builder::new()
            .name("framewarp-encoder-log".into())
            .spawn(move || {
                for event in events {
                    match event {
                        FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg) => {
                            warn!("[ffmpeg] {msg}")
                        }
                        FfmpegEvent::Error(e) => warn!("[ffmpeg] {e}"),
                        _ => (),
                    }
                }
            })
            .context("spawning encoder log thread")?;

        debug!(path = %self.path.display(), %size, "encoder started");
        Ok(Encoder {
            child,
            stdin,
            diagnostics,
            dimensions,
            frames: 0,
        })
    }
}

impl Encoder {
    fn write(&mut self, frame: &Frame) -> Result<()> {
        if frame.dimensions() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: frame.dimensions(),
            }
            .into());
        }
        self.stdin
            .write_all(frame.as_raw())
            .context("writing frame to ffmpeg")?;
        self.frames += 1;
        Ok(())
    }

    fn finish(self) -> Result<()> {
        let Encoder {
            mut child,
            stdin,
            diagnostics,
            ..
        } = self;

        // closing stdin is ffmpeg's end of input
        drop(stdin);
        let status = child.wait().context("waiting for ffmpeg encoder")?;
        if diagnostics.join().is_err() {
            warn!("encoder log thread panicked");
        }
        if !status.success() {
            bail!("ffmpeg encoder exited with {status}");
        }
        Ok(())
    }
}

impl FrameSink for Recorder {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        if let State::Armed = self.state {
            self.state = State::Recording(self.spawn_encoder(frame.dimensions())?);
        }
        match &mut self.state {
            State::Recording(encoder) => encoder.write(frame),
            _ => Ok(()),
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.stop(|path| info!("recording saved to {}", path.display()))
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

//! Where frames come from.
//!
//! A source is polled once per tick. `None` is an ordinary answer meaning
//! "nothing new right now"; the caller skips the tick and asks again later.

use std::{
    collections::VecDeque,
    sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError},
    thread::{self, JoinHandle},
};

use anyhow::{Context, Result};
use ffmpeg_sidecar::{
    command::FfmpegCommand,
    event::{FfmpegEvent, LogLevel},
};
use tracing::{debug, info, warn};

use crate::frame::Frame;

/// Ten seconds at 30 fps.
pub const DEFAULT_LOOP_LIMIT: usize = 300;

pub trait FrameSource {
    /// The next frame, or `None` if none is available this tick.
    fn current_frame(&mut self) -> Option<Frame>;

    /// Whether the source may still produce frames.
    fn is_active(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct VideoSourceOptions {
    /// Anything ffmpeg accepts as an input: a file, a URL, a capture device.
    pub input: String,
    /// Input format passed as `-f`, e.g. `v4l2` for a webcam.
    pub format: Option<String>,
    /// Resize decoded frames to this size.
    pub size: Option<(u32, u32)>,
    /// Replay decoded frames once the input ends.
    pub looped: bool,
    /// Most recent frames kept for replay; older ones are dropped.
    pub loop_limit: usize,
    /// Decoded frames buffered ahead of the consumer.
    pub buffer: usize,
}

impl VideoSourceOptions {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            format: None,
            size: None,
            looped: false,
            loop_limit: DEFAULT_LOOP_LIMIT,
            buffer: 4,
        }
    }
}

/// Decodes a video through the system `ffmpeg` on a background thread.
pub struct VideoSource {
    rx: Option<Receiver<Frame>>,
    decoder: Option<JoinHandle<Result<u64>>>,
    looped: bool,
    history: VecDeque<Frame>,
    loop_limit: usize,
    cursor: usize,
}

impl VideoSource {
    pub fn spawn(options: VideoSourceOptions) -> Result<Self> {
        let (tx, rx) = sync_channel(options.buffer.max(1));
        let looped = options.looped;
        let loop_limit = options.loop_limit.max(1);

        let decoder = thread::Builder::new()
            .name("framewarp-decoder".into())
            .spawn(move || decode(&options, tx))
            .context("spawning decoder thread")?;

        Ok(Self {
            rx: Some(rx),
            decoder: Some(decoder),
            looped,
            history: VecDeque::new(),
            loop_limit,
            cursor: 0,
        })
    }

    fn finish_decoding(&mut self) {
        self.rx = None;
        let Some(decoder) = self.decoder.take() else {
            return;
        };

        match decoder.join() {
            Ok(Ok(count)) => info!(frames = count, "input ended"),
            Ok(Err(e)) => warn!("decoder failed: {e:#}"),
            Err(_) => warn!("decoder thread panicked"),
        }
    }

    fn replay(&mut self) -> Option<Frame> {
        if !self.looped || self.history.is_empty() {
            return None;
        }
        let frame = self.history[self.cursor % self.history.len()].clone();
        self.cursor += 1;
        Some(frame)
    }
}

impl FrameSource for VideoSource {
    fn current_frame(&mut self) -> Option<Frame> {
        if let Some(rx) = &self.rx {
            match rx.try_recv() {
                Ok(frame) => {
                    if self.looped {
                        if self.history.len() == self.loop_limit {
                            self.history.pop_front();
                        }
                        self.history.push_back(frame.clone());
                    }
                    return Some(frame);
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => self.finish_decoding(),
            }
        }
        self.replay()
    }

    fn is_active(&self) -> bool {
        self.rx.is_some() || (self.looped && !self.history.is_empty())
    }
}

fn decode(options: &VideoSourceOptions, tx: SyncSender<Frame>) -> Result<u64> {
    let mut command = FfmpegCommand::new();
    command.hide_banner();
    if let Some(format) = &options.format {
        command.args(["-f", format.as_str()]);
    }
    command.input(&options.input);
    if let Some((width, height)) = options.size {
        let scale = format!("scale={width}:{height}");
        command.args(["-vf", scale.as_str()]);
    }
    command.args("-f rawvideo -pix_fmt rgba -".split(' '));

    debug!(input = %options.input, "starting decoder");
    let mut decoder = command
        .spawn()
        .with_context(|| format!("starting ffmpeg for {}", options.input))?;

    let mut count = 0;
    for event in decoder.iter()? {
        match event {
            FfmpegEvent::OutputFrame(frame) => {
                let frame = Frame::from_raw(frame.width, frame.height, frame.data)
                    .context("decoded frame has an unexpected layout")?;
                if tx.send(frame).is_err() {
                    debug!("frame consumer went away, stopping decoder");
                    decoder.kill().context("stopping ffmpeg")?;
                    break;
                }
                count += 1;
            }
            FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg) => warn!("[ffmpeg] {msg}"),
            FfmpegEvent::Error(e) => warn!("[ffmpeg] {e}"),
            _ => (),
        }
    }

    decoder.wait().context("waiting for ffmpeg")?;
    Ok(count)
}

/// Frames queued in memory, with optional gaps where no frame is available.
#[derive(Debug, Default)]
pub struct FrameQueue {
    frames: VecDeque<Option<Frame>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push_back(Some(frame));
    }

    /// Queues a tick on which no frame is available.
    pub fn push_gap(&mut self) {
        self.frames.push_back(None);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FromIterator<Frame> for FrameQueue {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().map(Some).collect(),
        }
    }
}

impl FrameSource for FrameQueue {
    fn current_frame(&mut self) -> Option<Frame> {
        self.frames.pop_front().flatten()
    }

    fn is_active(&self) -> bool {
        !self.frames.is_empty()
    }
}

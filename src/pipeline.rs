use anyhow::{Context, Result};
use tracing::{debug, trace};

use crate::{
    frame::Frame,
    sink::FrameSink,
    source::FrameSource,
    transform::{Transformer, TransformerChain},
};

/// What a single [`Pipeline::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// A frame went through the chain and reached every sink.
    Presented,
    /// The source had nothing this time.
    Skipped,
    /// The source is exhausted.
    Finished,
}

/// Moves frames from a source through a chain into sinks, one per tick.
pub struct Pipeline<S> {
    source: S,
    chain: TransformerChain,
    sinks: Vec<Box<dyn FrameSink>>,
    presented: u64,
}

impl<S: FrameSource> Pipeline<S> {
    pub fn new(source: S, chain: TransformerChain) -> Self {
        Self {
            source,
            chain,
            sinks: Vec::new(),
            presented: 0,
        }
    }

    pub fn add_sink(&mut self, sink: impl FrameSink + 'static) {
        debug!(sink = sink.name(), "adding sink");
        self.sinks.push(Box::new(sink));
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn tick(&mut self) -> Result<Tick> {
        match self.source.current_frame() {
            Some(frame) => {
                self.process(&frame)?;
                Ok(Tick::Presented)
            }
            None if self.source.is_active() => {
                trace!("no frame available, skipping tick");
                Ok(Tick::Skipped)
            }
            None => Ok(Tick::Finished),
        }
    }

    /// Runs one frame through the chain and hands the result to every sink.
    pub fn process(&mut self, frame: &Frame) -> Result<()> {
        let out = self.chain.transform(frame)?;
        for sink in self.sinks.iter_mut() {
            sink.present(&out)
                .with_context(|| format!("presenting to {} sink", sink.name()))?;
        }
        self.presented += 1;
        Ok(())
    }

    /// Lets every sink flush and close.
    pub fn finish(mut self) -> Result<()> {
        for sink in self.sinks.iter_mut() {
            sink.finish()
                .with_context(|| format!("finishing {} sink", sink.name()))?;
        }
        debug!(frames = self.presented, "pipeline finished");
        Ok(())
    }
}

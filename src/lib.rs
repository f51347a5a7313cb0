//! Per-pixel and per-frame transforms over RGBA8 video frames.
//!
//! Frames come from a [`source::FrameSource`], pass through a
//! [`transform::TransformerChain`] and end up in one or more
//! [`sink::FrameSink`]s. Geometric transforms use inverse mapping: for every
//! destination pixel they compute where to sample in the source and
//! interpolate bilinearly there.

pub mod error;
pub mod frame;
pub mod pipeline;
pub mod recorder;
pub mod sink;
pub mod source;
pub mod transform;

pub use error::{Error, Result};
pub use frame::{Color, Frame};
pub use pipeline::{Pipeline, Tick};
pub use transform::{ForEach, PixelTransform, Transformer, TransformerChain};

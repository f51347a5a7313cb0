mod bulge;
mod chain;
mod contrast;
mod firework;
mod flip;
mod recipe;
mod scale;
mod swirl;
mod translate;

pub use bulge::Bulge;
pub use chain::TransformerChain;
pub use contrast::{FastContrast, LuminanceContrast, SafeContrast, MAX_SAFE_CONTRAST};
pub use firework::Firework;
pub use flip::{HorizontalFlip, VerticalFlip};
pub use recipe::TransformRecipe;
pub use scale::Scale;
pub use swirl::Swirl;
pub use translate::Translate;

use crate::{
    error::Result,
    frame::{Color, Frame},
};

/// A whole-frame transformation.
///
/// Implementations never mutate their input; every call returns a freshly
/// owned frame.
pub trait Transformer: Send + Sync {
    fn transform(&self, frame: &Frame) -> Result<Frame>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

impl<T: Transformer + ?Sized> Transformer for Box<T> {
    fn transform(&self, frame: &Frame) -> Result<Frame> {
        (**self).transform(frame)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// A per-pixel transformation, lifted to a [`Transformer`] by [`ForEach`].
pub trait PixelTransform: Send + Sync {
    const NAME: &'static str;

    /// Computes the destination color at `(x, y)`.
    ///
    /// `frame` is always the untouched source frame, so implementations may
    /// sample any neighbour.
    fn pixel_transform(&self, frame: &Frame, x: u32, y: u32, color: Color) -> Color;

    fn for_each(self) -> ForEach<Self>
    where
        Self: Sized,
    {
        ForEach(self)
    }
}

/// Runs a [`PixelTransform`] over every pixel of a frame.
///
/// Reads come from the source frame only and writes go to a clone, so the
/// result does not depend on traversal order.
#[derive(Debug, Clone)]
pub struct ForEach<P>(pub P);

impl<P: PixelTransform> ForEach<P> {
    pub fn new(pixel: P) -> Self {
        Self(pixel)
    }
}

impl<P: PixelTransform> Transformer for ForEach<P> {
    fn transform(&self, frame: &Frame) -> Result<Frame> {
        let mut out = frame.clone();
        frame.each_point(|x, y, color| {
            out.set_point(x, y, self.0.pixel_transform(frame, x, y, color));
        });
        Ok(out)
    }

    fn name(&self) -> &'static str {
        P::NAME
    }
}

use tracing::{debug, trace};

use super::Transformer;
use crate::{
    error::{Error, Result},
    frame::Frame,
};

/// Runs transformers one after another, each consuming the previous output.
#[derive(Default)]
pub struct TransformerChain {
    transformers: Vec<Box<dyn Transformer>>,
    dimensions: Option<(u32, u32)>,
}

impl TransformerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain that only accepts frames of the given size.
    ///
    /// Stages configured with absolute coordinates (centers, radii) only make
    /// sense for one geometry, so a frame of any other size is rejected.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            transformers: Vec::new(),
            dimensions: Some((width, height)),
        }
    }

    pub fn add_transformer(&mut self, transformer: impl Transformer + 'static) {
        debug!(stage = transformer.name(), index = self.len(), "adding transformer");
        self.transformers.push(Box::new(transformer));
    }

    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.transformers.iter().map(|t| t.name())
    }
}

impl Extend<Box<dyn Transformer>> for TransformerChain {
    fn extend<I: IntoIterator<Item = Box<dyn Transformer>>>(&mut self, iter: I) {
        for transformer in iter {
            self.add_transformer(transformer);
        }
    }
}

impl Transformer for TransformerChain {
    fn transform(&self, frame: &Frame) -> Result<Frame> {
        if let Some(expected) = self.dimensions {
            let actual = frame.dimensions();
            if actual != expected {
                return Err(Error::DimensionMismatch { expected, actual });
            }
        }

        let mut out = frame.clone();
        for (index, transformer) in self.transformers.iter().enumerate() {
            trace!(stage = transformer.name(), index, "running stage");
            out = transformer.transform(&out)?;
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{FastContrast, HorizontalFlip, PixelTransform, Translate};

    fn numbered() -> Frame {
        let mut frame = Frame::new(4, 2).unwrap();
        for y in 0..2 {
            for x in 0..4 {
                frame.set_point(x, y, [(y * 4 + x) as u8 * 30, 10, 20, 255]);
            }
        }
        frame
    }

    #[test]
    fn empty_chain_is_identity() {
        let frame = numbered();
        let chain = TransformerChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.transform(&frame).unwrap(), frame);
    }

    #[test]
    fn stages_run_in_order() {
        let frame = numbered();

        let mut chain = TransformerChain::new();
        chain.add_transformer(Translate::new(1.0, 0.0).unwrap());
        chain.add_transformer(HorizontalFlip.for_each());
        assert_eq!(chain.names().collect::<Vec<_>>(), vec!["translate", "hflip"]);

        let by_hand = HorizontalFlip
            .for_each()
            .transform(&Translate::new(1.0, 0.0).unwrap().transform(&frame).unwrap())
            .unwrap();
        assert_eq!(chain.transform(&frame).unwrap(), by_hand);

        let reversed = Translate::new(1.0, 0.0)
            .unwrap()
            .transform(&HorizontalFlip.for_each().transform(&frame).unwrap())
            .unwrap();
        assert_ne!(by_hand, reversed);
    }

    #[test]
    fn input_is_left_untouched() {
        let frame = numbered();
        let snapshot = frame.clone();
        let mut chain = TransformerChain::new();
        chain.add_transformer(FastContrast::new(3.0).unwrap().for_each());
        let out = chain.transform(&frame).unwrap();
        assert_eq!(frame, snapshot);
        assert_ne!(out, frame);
    }

    #[test]
    fn fixed_dimensions_reject_other_sizes() {
        let chain = TransformerChain::with_dimensions(4, 2);
        assert!(chain.transform(&numbered()).is_ok());

        let other = Frame::new(2, 4).unwrap();
        match chain.transform(&other) {
            Err(Error::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, (4, 2));
                assert_eq!(actual, (2, 4));
            }
            other => panic!("expected a dimension mismatch, got {other:?}"),
        }
    }

    #[test]
    fn chains_nest() {
        let frame = numbered();
        let mut inner = TransformerChain::new();
        inner.add_transformer(HorizontalFlip.for_each());
        let mut outer = TransformerChain::new();
        outer.add_transformer(inner);
        assert_eq!(
            outer.transform(&frame).unwrap(),
            HorizontalFlip.for_each().transform(&frame).unwrap()
        );
    }
}

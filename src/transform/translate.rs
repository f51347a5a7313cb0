use super::Transformer;
use crate::{
    error::{ensure_finite, Result},
    frame::Frame,
};

/// Shifts a frame with toroidal wraparound: whatever leaves one edge comes
/// back in on the opposite edge.
///
/// Offsets are wrapped into the frame and truncated to whole pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Translate {
    dx: f64,
    dy: f64,
}

impl Translate {
    pub fn new(dx: f64, dy: f64) -> Result<Self> {
        ensure_finite("translate", &[dx, dy])?;
        Ok(Self { dx, dy })
    }

    /// Moves `distance` pixels in direction `angle` (radians, clockwise from
    /// the x axis in screen space).
    pub fn polar(angle: f64, distance: f64) -> Result<Self> {
        ensure_finite("translate", &[angle, distance])?;
        Self::new(distance * angle.cos(), distance * angle.sin())
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.dx, self.dy)
    }
}

/// Floored modulo of `offset` into `[0, size)`, in whole pixels.
fn wrap(offset: f64, size: u32) -> i64 {
    let size = i64::from(size);
    let wrapped = offset.rem_euclid(size as f64).floor() as i64;
    // rem_euclid may round up to `size` for tiny negative offsets
    if wrapped >= size {
        0
    } else {
        wrapped
    }
}

impl Transformer for Translate {
    fn transform(&self, frame: &Frame) -> Result<Frame> {
        let (width, height) = frame.dimensions();
        let dx = wrap(self.dx, width);
        let dy = wrap(self.dy, height);

        let mut scratch = Frame::new(width, height)?;
        for ix in 0..2 {
            for iy in 0..2 {
                scratch.blit(
                    frame,
                    dx - ix * i64::from(width),
                    dy - iy * i64::from(height),
                );
            }
        }

        Ok(scratch)
    }

    fn name(&self) -> &'static str {
        "translate"
    }
}

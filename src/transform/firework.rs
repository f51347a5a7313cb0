use std::f64::consts::PI;

use super::{Bulge, PixelTransform};
use crate::{
    error::{ensure_finite, Error, Result},
    frame::{Color, Frame},
};

/// Alternating bulge and pinch spokes radiating from a point.
///
/// The full turn around the center is split into `2 * spokes` equal sectors;
/// odd halves bulge with `scale`, even halves pinch with `1 / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct Firework {
    x: f64,
    y: f64,
    /// Sector cycles per radian.
    spokes: f64,
    bulge_out: Bulge,
    bulge_in: Bulge,
}

impl Firework {
    pub fn new(x: f64, y: f64, scale: f64, radius: f64, spokes: u32) -> Result<Self> {
        ensure_finite("firework", &[x, y, scale, radius])?;
        if scale == 0.0 {
            return Err(Error::configuration("firework scale must be non-zero"));
        }
        if spokes == 0 {
            return Err(Error::configuration("firework needs at least one spoke"));
        }

        Ok(Self {
            x,
            y,
            spokes: f64::from(spokes) / PI * 0.5,
            bulge_out: Bulge::new(x, y, scale, radius)?,
            bulge_in: Bulge::new(x, y, 1.0 / scale, radius)?,
        })
    }

    /// Position of `(x, y)` within its sector, in `[0, 1)`.
    fn sector(&self, x: f64, y: f64) -> f64 {
        let angle = (x - self.x).atan2(y - self.y) + PI;
        (angle * self.spokes).rem_euclid(1.0)
    }
}

impl PixelTransform for Firework {
    const NAME: &'static str = "firework";

    fn pixel_transform(&self, frame: &Frame, x: u32, y: u32, color: Color) -> Color {
        if self.sector(f64::from(x), f64::from(y)) > 0.5 {
            self.bulge_out.pixel_transform(frame, x, y, color)
        } else {
            self.bulge_in.pixel_transform(frame, x, y, color)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transformer;

    fn ramp(size: u32) -> Frame {
        let mut frame = Frame::new(size, size).unwrap();
        for y in 0..size {
            for x in 0..size {
                frame.set_point(x, y, [(x * 9) as u8, (y * 9) as u8, 128, 255]);
            }
        }
        frame
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(Firework::new(0.0, 0.0, 0.0, 10.0, 4).is_err());
        assert!(Firework::new(0.0, 0.0, 2.0, 10.0, 0).is_err());
        assert!(Firework::new(0.0, 0.0, 2.0, 0.0, 4).is_err());
    }

    #[test]
    fn sectors_alternate_around_the_center() {
        let firework = Firework::new(0.0, 0.0, 2.0, 10.0, 1).unwrap();
        // one spoke: atan2(dx, dy) + pi sweeps a single cycle
        // straight up (dy < 0) sits at angle 2pi, i.e. sector 0
        assert!(firework.sector(0.0, -1.0) < 1e-9 || firework.sector(0.0, -1.0) > 1.0 - 1e-9);
        // straight down (dy > 0) sits at angle pi, sector 0.5
        assert!((firework.sector(0.0, 1.0) - 0.5).abs() < 1e-9);
        // left of center: angle pi/2, first half
        assert!((firework.sector(-1.0, 0.0) - 0.25).abs() < 1e-9);
        // right of center: angle 3pi/2, second half
        assert!((firework.sector(1.0, 0.0) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn delegates_to_matching_bulge() {
        let frame = ramp(21);
        let firework = Firework::new(10.0, 10.0, 2.0, 8.0, 1).unwrap();
        let out_bulge = Bulge::new(10.0, 10.0, 2.0, 8.0).unwrap();
        let in_bulge = Bulge::new(10.0, 10.0, 0.5, 8.0).unwrap();

        let right = frame.get_point(14, 10);
        assert_eq!(
            firework.pixel_transform(&frame, 14, 10, right),
            out_bulge.pixel_transform(&frame, 14, 10, right)
        );

        let left = frame.get_point(6, 10);
        assert_eq!(
            firework.pixel_transform(&frame, 6, 10, left),
            in_bulge.pixel_transform(&frame, 6, 10, left)
        );
    }

    #[test]
    fn unit_scale_is_identity() {
        let frame = ramp(16);
        let out = Firework::new(8.0, 8.0, 1.0, 6.0, 5)
            .unwrap()
            .for_each()
            .transform(&frame)
            .unwrap();
        assert_eq!(out, frame);
    }
}

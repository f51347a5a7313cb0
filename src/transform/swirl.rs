use super::PixelTransform;
use crate::{
    error::{ensure_finite, Error, Result},
    frame::{Color, Frame},
};

/// Rotates pixels around a point; the rotation is `turn` radians at the
/// center and falls off linearly to zero at `radius`.
#[derive(Debug, Clone, PartialEq)]
pub struct Swirl {
    x: f64,
    y: f64,
    turn: f64,
    radius: f64,
}

impl Swirl {
    pub fn new(x: f64, y: f64, turn: f64, radius: f64) -> Result<Self> {
        ensure_finite("swirl", &[x, y, turn, radius])?;
        if radius <= 0.0 {
            return Err(Error::configuration(format!(
                "swirl radius must be positive, got {radius}"
            )));
        }

        Ok(Self {
            x,
            y,
            turn,
            radius,
        })
    }
}

impl PixelTransform for Swirl {
    const NAME: &'static str = "swirl";

    fn pixel_transform(&self, frame: &Frame, x: u32, y: u32, color: Color) -> Color {
        let (x, y) = (f64::from(x), f64::from(y));
        if x == self.x && y == self.y {
            return color;
        }

        let diff_x = x - self.x;
        let diff_y = y - self.y;
        let distance_sq = diff_x * diff_x + diff_y * diff_y;
        let radius_sq = self.radius * self.radius;

        if distance_sq > radius_sq {
            return color;
        }

        let ratio = 1.0 - (distance_sq / radius_sq).sqrt();
        let (sin, cos) = (ratio * self.turn).sin_cos();

        let new_x = diff_x * cos - diff_y * sin + self.x;
        let new_y = diff_x * sin + diff_y * cos + self.y;

        frame.interpolate_at(new_x, new_y)
    }
}

use super::PixelTransform;
use crate::{
    error::{ensure_finite, Error, Result},
    frame::{Color, Frame},
};

/// Bulges outward (`scale > 1`) or pinches inward (`scale < 1`) around a
/// point, fading out at `radius`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bulge {
    x: f64,
    y: f64,
    scale: f64,
    radius: f64,
}

impl Bulge {
    pub fn new(x: f64, y: f64, scale: f64, radius: f64) -> Result<Self> {
        ensure_finite("bulge", &[x, y, scale, radius])?;
        if radius <= 0.0 {
            return Err(Error::configuration(format!(
                "bulge radius must be positive, got {radius}"
            )));
        }

        Ok(Self {
            x,
            y,
            scale,
            radius,
        })
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl PixelTransform for Bulge {
    const NAME: &'static str = "bulge";

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

        let new_ratio = (distance_sq / radius_sq).powf(self.scale * 0.5);
        let multiplier = new_ratio * self.radius / distance_sq.sqrt();

        frame.interpolate_at(multiplier * diff_x + self.x, multiplier * diff_y + self.y)
    }
}

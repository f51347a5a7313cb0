use super::PixelTransform;
use crate::{
    error::{ensure_finite, Error, Result},
    frame::{Color, Frame},
};

/// Magnifies (`> 1`) or shrinks (`< 1`) the frame around a center point.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    // reciprocals of the scale factors, applied to the destination offset
    inv_x: f64,
    inv_y: f64,
    center_x: f64,
    center_y: f64,
}

impl Scale {
    pub fn new(sx: f64, sy: f64, center_x: f64, center_y: f64) -> Result<Self> {
        ensure_finite("scale", &[sx, sy, center_x, center_y])?;
        if sx == 0.0 || sy == 0.0 {
            return Err(Error::configuration(format!(
                "scale factors must be non-zero, got {sx}x{sy}"
            )));
        }

        Ok(Self {
            inv_x: 1.0 / sx,
            inv_y: 1.0 / sy,
            center_x,
            center_y,
        })
    }

    pub fn uniform(scale: f64, center_x: f64, center_y: f64) -> Result<Self> {
        Self::new(scale, scale, center_x, center_y)
    }
}

impl PixelTransform for Scale {
    const NAME: &'static str = "scale";

    fn pixel_transform(&self, frame: &Frame, x: u32, y: u32, _color: Color) -> Color {
        let new_x = (f64::from(x) - self.center_x) * self.inv_x + self.center_x;
        let new_y = (f64::from(y) - self.center_y) * self.inv_y + self.center_y;
        frame.interpolate_at(new_x, new_y)
    }
}

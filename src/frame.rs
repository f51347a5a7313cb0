//! Frame storage and sampling.
//!
//! A [`Frame`] is a packed RGBA8 raster, row-major with the origin in the
//! top-left corner. Reads produce [`Color`]s with `f64` channels so that
//! interpolation and contrast math can run outside `0..=255`; writes clamp
//! back into a byte.

use std::ops::{Add, Mul};

use image::{imageops, Rgba, RgbaImage};

use crate::error::{Error, Result};

pub const OPAQUE: f64 = 255.0;

/// A color with four independent channels.
///
/// Channels are nominally `0..=255` but may leave that range while a
/// transform is still working on them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Fully opaque color.
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::new(red, green, blue, OPAQUE)
    }

    /// Applies `f` to all four channels, alpha included.
    pub fn map(self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self {
            red: f(self.red),
            green: f(self.green),
            blue: f(self.blue),
            alpha: f(self.alpha),
        }
    }

    /// Clamps and rounds every channel the way a byte store does.
    pub fn to_rgba8(self) -> Rgba<u8> {
        Rgba([
            store_channel(self.red),
            store_channel(self.green),
            store_channel(self.blue),
            store_channel(self.alpha),
        ])
    }
}

impl From<Rgba<u8>> for Color {
    fn from(px: Rgba<u8>) -> Self {
        let [r, g, b, a] = px.0;
        Self::new(r.into(), g.into(), b.into(), a.into())
    }
}

impl From<[u8; 4]> for Color {
    fn from(px: [u8; 4]) -> Self {
        Rgba(px).into()
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::rgb(r.into(), g.into(), b.into())
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(
            self.red + rhs.red,
            self.green + rhs.green,
            self.blue + rhs.blue,
            self.alpha + rhs.alpha,
        )
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, rhs: f64) -> Color {
        self.map(|c| c * rhs)
    }
}

fn store_channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// An owned RGBA8 raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    image: RgbaImage,
}

impl Frame {
    /// Transparent black frame.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        ensure_dimensions(width, height)?;
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    /// Frame filled with a single color.
    pub fn filled(width: u32, height: u32, color: impl Into<Color>) -> Result<Self> {
        ensure_dimensions(width, height)?;
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, color.into().to_rgba8()),
        })
    }

    /// Wraps packed RGBA8 bytes, e.g. a decoded video frame.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        ensure_dimensions(width, height)?;
        let expected = width as usize * height as usize * 4;
        // RgbaImage::from_raw accepts oversized buffers, a frame must match exactly
        if data.len() != expected {
            return Err(Error::invalid_frame(format!(
                "{width}x{height} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        let image = RgbaImage::from_raw(width, height, data)
            .ok_or_else(|| Error::invalid_frame("buffer rejected by image"))?;
        Ok(Self { image })
    }

    pub fn from_image(image: RgbaImage) -> Result<Self> {
        ensure_dimensions(image.width(), image.height())?;
        Ok(Self { image })
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Packed RGBA8 bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Color at integer coordinates.
    ///
    /// # Panics
    ///
    /// When `(x, y)` lies outside the frame. Callers clamp first.
    pub fn get_point(&self, x: u32, y: u32) -> Color {
        (*self.image.get_pixel(x, y)).into()
    }

    /// Writes `color` at `(x, y)`, clamping each channel into a byte.
    ///
    /// Use [`Color::rgb`] for a color without an explicit alpha; it is stored
    /// fully opaque.
    pub fn set_point(&mut self, x: u32, y: u32, color: impl Into<Color>) {
        self.image.put_pixel(x, y, color.into().to_rgba8());
    }

    /// Bilinear sample at fractional coordinates.
    ///
    /// The four neighbours are clamped into the frame; the result is not
    /// clamped, so callers decide what to do with out-of-range channels.
    pub fn interpolate_at(&self, x: f64, y: f64) -> Color {
        let max_x = f64::from(self.width() - 1);
        let max_y = f64::from(self.height() - 1);

        let left = x.floor().clamp(0.0, max_x) as u32;
        let right = x.ceil().clamp(0.0, max_x) as u32;
        let upper = y.floor().clamp(0.0, max_y) as u32;
        let lower = y.ceil().clamp(0.0, max_y) as u32;

        let x_frac = x.rem_euclid(1.0);
        let y_frac = y.rem_euclid(1.0);

        let upper_left = self.get_point(left, upper);
        let upper_right = self.get_point(right, upper);
        let lower_left = self.get_point(left, lower);
        let lower_right = self.get_point(right, lower);

        let top = upper_left * (1.0 - x_frac) + upper_right * x_frac;
        let bottom = lower_left * (1.0 - x_frac) + lower_right * x_frac;
        top * (1.0 - y_frac) + bottom * y_frac
    }

    /// Visits every pixel in row-major order.
    pub fn each_point(&self, mut action: impl FnMut(u32, u32, Color)) {
        for (x, y, px) in self.image.enumerate_pixels() {
            action(x, y, (*px).into());
        }
    }

    /// Copies `src` so that its top-left corner lands on `(ox, oy)`.
    ///
    /// Parts of `src` falling outside this frame are dropped. Pixels are
    /// replaced, not blended.
    pub fn blit(&mut self, src: &Frame, ox: i64, oy: i64) {
        imageops::replace(&mut self.image, &src.image, ox, oy);
    }
}

fn ensure_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_frame(format!(
            "dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Frame {
        let mut frame = Frame::new(width, height).unwrap();
        for y in 0..height {
            for x in 0..width {
                frame.set_point(x, y, [(x * 10) as u8, (y * 10) as u8, 7, 200]);
            }
        }
        frame
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(Frame::new(0, 4).is_err());
        assert!(Frame::new(4, 0).is_err());
    }

    #[test]
    fn from_raw_requires_exact_length() {
        assert!(Frame::from_raw(2, 2, vec![0; 16]).is_ok());
        assert!(Frame::from_raw(2, 2, vec![0; 15]).is_err());
        assert!(Frame::from_raw(2, 2, vec![0; 20]).is_err());
    }

    #[test]
    fn set_point_defaults_to_opaque() {
        let mut frame = Frame::new(1, 1).unwrap();
        frame.set_point(0, 0, Color::rgb(1.0, 2.0, 3.0));
        assert_eq!(frame.as_raw(), &[1, 2, 3, 255]);

        frame.set_point(0, 0, [4u8, 5, 6]);
        assert_eq!(frame.as_raw(), &[4, 5, 6, 255]);
    }

    #[test]
    fn set_point_clamps_and_rounds() {
        let mut frame = Frame::new(1, 1).unwrap();
        frame.set_point(0, 0, Color::new(-12.0, 300.0, 2.5, 3.5));
        assert_eq!(frame.as_raw(), &[0, 255, 2, 4]);
    }

    #[test]
    fn clone_is_independent() {
        let original = gradient(3, 2);
        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.set_point(0, 0, [9u8, 9, 9, 9]);
        assert_ne!(copy, original);
        assert_eq!(original.get_point(0, 0), Color::new(0.0, 0.0, 7.0, 200.0));
    }

    #[test]
    fn interpolate_at_integers_matches_get_point() {
        let frame = gradient(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(
                    frame.interpolate_at(f64::from(x), f64::from(y)),
                    frame.get_point(x, y)
                );
            }
        }
    }

    #[test]
    fn interpolate_blends_neighbours() {
        let frame = gradient(2, 2);
        let c = frame.interpolate_at(0.5, 0.25);
        assert!((c.red - 5.0).abs() < 1e-9);
        assert!((c.green - 2.5).abs() < 1e-9);
        assert!((c.blue - 7.0).abs() < 1e-9);
    }

    #[test]
    fn interpolate_clamps_outside_coordinates() {
        let frame = gradient(3, 3);
        assert_eq!(frame.interpolate_at(-4.0, -4.0), frame.get_point(0, 0));
        assert_eq!(frame.interpolate_at(10.0, 10.0), frame.get_point(2, 2));
    }

    #[test]
    fn interpolate_uses_floored_fraction_for_negatives() {
        // x = -0.25 clamps both columns to 0, so only the row blend shows
        let frame = gradient(2, 2);
        let c = frame.interpolate_at(-0.25, 0.5);
        assert!((c.red - 0.0).abs() < 1e-9);
        assert!((c.green - 5.0).abs() < 1e-9);
    }

    #[test]
    fn each_point_is_row_major() {
        let frame = gradient(2, 2);
        let mut seen = Vec::new();
        frame.each_point(|x, y, _| seen.push((x, y)));
        assert_eq!(seen, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn blit_clips_to_destination() {
        let src = Frame::filled(2, 2, [1u8, 2, 3, 4]).unwrap();
        let mut dst = Frame::new(3, 3).unwrap();
        dst.blit(&src, 2, -1);

        assert_eq!(dst.get_point(2, 0), Color::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(dst.get_point(2, 1), Color::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(dst.get_point(1, 0), Color::new(0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn blit_fully_outside_is_noop() {
        let src = Frame::filled(2, 2, [1u8, 2, 3, 4]).unwrap();
        let mut dst = Frame::new(2, 2).unwrap();
        dst.blit(&src, -2, 0);
        dst.blit(&src, 0, 2);
        assert_eq!(dst, Frame::new(2, 2).unwrap());
    }
}

//! Mirror transforms.
//!
//! Both flips read from `size - coordinate` rather than
//! `size - 1 - coordinate`, so the first column (or row) samples past the
//! edge and is clamped back onto the last one. The result is a mirror shifted
//! by one pixel, with the outermost line duplicated.

use super::PixelTransform;
use crate::frame::{Color, Frame};

/// Flips a frame across its vertical axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HorizontalFlip;

impl PixelTransform for HorizontalFlip {
    const NAME: &'static str = "hflip";

    fn pixel_transform(&self, frame: &Frame, x: u32, y: u32, _color: Color) -> Color {
        let source_x = (frame.width() - x).min(frame.width() - 1);
        frame.get_point(source_x, y)
    }
}

/// Flips a frame across its horizontal axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerticalFlip;

impl PixelTransform for VerticalFlip {
    const NAME: &'static str = "vflip";

    fn pixel_transform(&self, frame: &Frame, x: u32, y: u32, _color: Color) -> Color {
        let source_y = (frame.height() - y).min(frame.height() - 1);
        frame.get_point(x, source_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transformer;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn quad() -> Frame {
        Frame::from_raw(2, 2, [RED, GREEN, BLUE, WHITE].concat()).unwrap()
    }

    #[test]
    fn vertical_flip_reads_height_minus_y() {
        let out = VerticalFlip.for_each().transform(&quad()).unwrap();
        assert_eq!(out.as_raw(), [BLUE, WHITE, BLUE, WHITE].concat().as_slice());
    }

    #[test]
    fn horizontal_flip_reads_width_minus_x() {
        let out = HorizontalFlip.for_each().transform(&quad()).unwrap();
        assert_eq!(out.as_raw(), [GREEN, GREEN, WHITE, WHITE].concat().as_slice());
    }

    #[test]
    fn wider_flip_shifts_by_one() {
        let mut frame = Frame::new(4, 1).unwrap();
        for x in 0..4 {
            frame.set_point(x, 0, [x as u8, 0, 0, 255]);
        }
        let out = HorizontalFlip.for_each().transform(&frame).unwrap();
        let reds: Vec<u8> = out.as_raw().chunks(4).map(|px| px[0]).collect();
        assert_eq!(reds, vec![3, 3, 2, 1]);
    }
}

//! Contrast transforms. All three stretch values away from mid-grey (128);
//! they differ in how they handle the ends of the range.

use super::PixelTransform;
use crate::{
    error::{ensure_finite, Error, Result},
    frame::{Color, Frame},
};

const MID: f64 = 128.0;

/// Highest smoothstep order whose power-basis coefficients fit in an `f64`.
pub const MAX_SAFE_CONTRAST: u32 = 344;

fn linear_contrast(value: f64, intensity: f64) -> f64 {
    (value - MID) * intensity + MID
}

fn clamp_channel(value: f64) -> f64 {
    value.clamp(0.0, 255.0)
}

/// Linear contrast with clipping. Cheap, loses detail at the extremes.
#[derive(Debug, Clone, PartialEq)]
pub struct FastContrast {
    intensity: f64,
}

impl FastContrast {
    pub fn new(intensity: f64) -> Result<Self> {
        ensure_finite("fast contrast", &[intensity])?;
        Ok(Self { intensity })
    }

    pub fn contrast(&self, color: Color) -> Color {
        color.map(|c| clamp_channel(linear_contrast(c, self.intensity)))
    }
}

impl PixelTransform for FastContrast {
    const NAME: &'static str = "fast-contrast";

    fn pixel_transform(&self, _frame: &Frame, _x: u32, _y: u32, color: Color) -> Color {
        self.contrast(color)
    }
}

/// Contrast through a smoothstep polynomial of order `intensity`.
///
/// The curve maps `[0, 1]` onto itself, so nothing clips; higher orders are
/// steeper and cost more per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SafeContrast {
    intensity: u32,
    coefficients: Vec<f64>,
    // C(2n+1, k) for k in n+1..=2n+1, the Bernstein weights of the same curve
    bernstein: Vec<f64>,
}

impl SafeContrast {
    pub fn new(intensity: i64) -> Result<Self> {
        let intensity = u32::try_from(intensity)
            .ok()
            .filter(|n| *n <= MAX_SAFE_CONTRAST)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "safe contrast intensity must be an integer in 0..={MAX_SAFE_CONTRAST}, got {intensity}"
                ))
            })?;

        let coefficients = smoothstep_coefficients(intensity);
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(Error::configuration(format!(
                "safe contrast intensity {intensity} overflows its coefficients"
            )));
        }

        let degree = 2 * intensity + 1;
        let bernstein = (intensity + 1..=degree)
            .map(|k| combination(f64::from(degree), k))
            .collect();

        Ok(Self {
            intensity,
            coefficients,
            bernstein,
        })
    }

    pub fn intensity(&self) -> u32 {
        self.intensity
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Applies the curve to one channel value.
    ///
    /// Evaluated as the upper tail of a degree `2n + 1` Bernstein sum. The
    /// power-basis [`coefficients`](Self::coefficients) describe the same
    /// polynomial but alternate in sign and cancel badly from `n` of about 20.
    pub fn contrast_value(&self, value: f64) -> f64 {
        let u = value / 256.0;
        let v = 1.0 - u;
        // bounded by MAX_SAFE_CONTRAST in new
        let n = self.intensity as i32;
        let degree = 2 * n + 1;
        let sum: f64 = self
            .bernstein
            .iter()
            .zip(n + 1..=degree)
            .map(|(weight, k)| weight * u.powi(k) * v.powi(degree - k))
            .sum();
        sum * 256.0
    }

    pub fn contrast(&self, color: Color) -> Color {
        color.map(|c| self.contrast_value(c))
    }
}

impl PixelTransform for SafeContrast {
    const NAME: &'static str = "safe-contrast";

    fn pixel_transform(&self, _frame: &Frame, _x: u32, _y: u32, color: Color) -> Color {
        self.contrast(color)
    }
}

/// `C(n, k)` as a falling factorial over `k!`, valid for negative `n`.
fn combination(n: f64, k: u32) -> f64 {
    (0..k).fold(1.0, |acc, i| {
        let i = f64::from(i);
        acc * (n - i) / (i + 1.0)
    })
}

/// Coefficients of the order-`n` smoothstep:
/// `S(u) = u^(n+1) * sum(c[i] * u^i)` with `c[i] = C(-n-1, i) * C(2n+1, n-i)`.
fn smoothstep_coefficients(n: u32) -> Vec<f64> {
    let top = f64::from(n);
    (0..=n)
        .map(|i| combination(-top - 1.0, i) * combination(2.0 * top + 1.0, n - i))
        .collect()
}

/// Scales the color by how much linear contrast moves its luminance, keeping
/// hue roughly intact.
#[derive(Debug, Clone, PartialEq)]
pub struct LuminanceContrast {
    intensity: f64,
}

impl LuminanceContrast {
    pub fn new(intensity: f64) -> Result<Self> {
        ensure_finite("luminance contrast", &[intensity])?;
        Ok(Self { intensity })
    }

    pub fn contrast(&self, color: Color) -> Color {
        let alpha = clamp_channel(linear_contrast(color.alpha, self.intensity));

        let luminance = (color.red + color.green + color.blue) / 3.0;
        if luminance == 0.0 {
            return Color { alpha, ..color };
        }

        let scalar = linear_contrast(luminance, self.intensity) / luminance;
        Color::new(
            clamp_channel(color.red * scalar),
            clamp_channel(color.green * scalar),
            clamp_channel(color.blue * scalar),
            alpha,
        )
    }
}

impl PixelTransform for LuminanceContrast {
    const NAME: &'static str = "luminance-contrast";

    fn pixel_transform(&self, _frame: &Frame, _x: u32, _y: u32, color: Color) -> Color {
        self.contrast(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transformer;

    #[test]
    fn fast_contrast_clamps() {
        let fast = FastContrast::new(2.0).unwrap();
        let out = fast.contrast(Color::new(64.0, 128.0, 192.0, 255.0));
        assert_eq!(out, Color::new(0.0, 128.0, 255.0, 255.0));
    }

    #[test]
    fn fast_contrast_unit_intensity_is_identity() {
        let fast = FastContrast::new(1.0).unwrap();
        for v in 0..=255u8 {
            let c = Color::from([v, v, v, v]);
            assert_eq!(fast.contrast(c), c);
        }
    }

    #[test]
    fn combination_supports_negative_top() {
        assert_eq!(combination(5.0, 0), 1.0);
        assert_eq!(combination(5.0, 2), 10.0);
        assert_eq!(combination(-2.0, 1), -2.0);
        assert_eq!(combination(-3.0, 2), 6.0);
        assert_eq!(combination(-3.0, 3), -10.0);
    }

    #[test]
    fn smoothstep_coefficients_match_known_orders() {
        assert_eq!(smoothstep_coefficients(0), vec![1.0]);
        assert_eq!(smoothstep_coefficients(1), vec![3.0, -2.0]);
        assert_eq!(smoothstep_coefficients(2), vec![10.0, -15.0, 6.0]);
        assert_eq!(smoothstep_coefficients(3), vec![35.0, -84.0, 70.0, -20.0]);
    }

    #[test]
    fn safe_contrast_zero_is_identity() {
        let safe = SafeContrast::new(0).unwrap();
        assert_eq!(safe.coefficients(), &[1.0]);
        for v in 0..=255 {
            let v = f64::from(v);
            assert!((safe.contrast_value(v) - v).abs() < 1e-9);
        }
    }

    #[test]
    fn safe_contrast_is_classic_smoothstep_at_one() {
        let safe = SafeContrast::new(1).unwrap();
        assert!((safe.contrast_value(128.0) - 128.0).abs() < 1e-9);
        assert!((safe.contrast_value(64.0) - 40.0).abs() < 1e-9);
        assert!(safe.contrast_value(0.0).abs() < 1e-12);
    }

    #[test]
    fn safe_contrast_stays_in_range() {
        for n in (0..8).chain([20, 30, 64, 100, i64::from(MAX_SAFE_CONTRAST)]) {
            let safe = SafeContrast::new(n).unwrap();
            for v in 0..=255 {
                let out = safe.contrast_value(f64::from(v));
                assert!((-1e-6..=256.0 + 1e-6).contains(&out), "n={n} v={v} out={out}");
            }
        }
    }

    #[test]
    fn safe_contrast_high_orders_stay_monotonic() {
        for n in [30, 100] {
            let safe = SafeContrast::new(n).unwrap();
            let outputs: Vec<f64> = (0..=255).map(|v| safe.contrast_value(f64::from(v))).collect();
            assert!(outputs.windows(2).all(|w| w[0] <= w[1] + 1e-9), "n={n}");
            assert!(outputs[0].abs() < 1e-12);
            assert!((outputs[128] - 128.0).abs() < 1e-6);
            assert!(outputs[255] > 255.0 && outputs[255] <= 256.0);
        }
    }

    #[test]
    fn bernstein_form_matches_power_basis() {
        for n in 0..6 {
            let safe = SafeContrast::new(n).unwrap();
            for v in (0..=255).step_by(17) {
                let u = f64::from(v) / 256.0;
                let power = safe
                    .coefficients()
                    .iter()
                    .rev()
                    .fold(0.0, |acc, c| acc * u + c)
                    * u.powi(n as i32 + 1)
                    * 256.0;
                assert!((safe.contrast_value(f64::from(v)) - power).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn safe_contrast_rejects_negative_intensity() {
        assert!(SafeContrast::new(-1).is_err());
        assert!(SafeContrast::new(i64::from(MAX_SAFE_CONTRAST)).is_ok());
        assert!(SafeContrast::new(i64::from(MAX_SAFE_CONTRAST) + 1).is_err());
        assert!(SafeContrast::new(i64::from(u32::MAX)).is_err());
    }

    #[test]
    fn luminance_contrast_passes_black_through() {
        let lum = LuminanceContrast::new(2.0).unwrap();
        let out = lum.contrast(Color::new(0.0, 0.0, 0.0, 200.0));
        assert_eq!(out, Color::new(0.0, 0.0, 0.0, 255.0));
    }

    #[test]
    fn luminance_contrast_scales_channels_together() {
        let lum = LuminanceContrast::new(2.0).unwrap();
        // luminance 160 -> 192, scalar 1.2
        let out = lum.contrast(Color::new(100.0, 160.0, 220.0, 128.0));
        assert!((out.red - 120.0).abs() < 1e-9);
        assert!((out.green - 192.0).abs() < 1e-9);
        assert_eq!(out.blue, 255.0);
        assert_eq!(out.alpha, 128.0);
    }

    #[test]
    fn contrast_transforms_run_per_pixel() {
        let frame = Frame::filled(2, 2, [64u8, 128, 192, 255]).unwrap();
        let out = FastContrast::new(2.0)
            .unwrap()
            .for_each()
            .transform(&frame)
            .unwrap();
        assert_eq!(out, Frame::filled(2, 2, [0u8, 128, 255, 255]).unwrap());
    }
}

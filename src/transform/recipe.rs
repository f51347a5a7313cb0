use std::{fmt, str::FromStr};

use super::{
    Bulge, FastContrast, Firework, HorizontalFlip, LuminanceContrast, PixelTransform,
    SafeContrast, Scale, Swirl, Transformer, Translate, VerticalFlip,
};
use crate::error::{Error, Result};

/// A textual transformer description, `name` or `name:arg,arg,...`.
///
/// ```text
/// bulge:cx,cy,scale,radius        swirl:cx,cy,turn,radius
/// firework:cx,cy,scale,radius,spokes
/// scale:s | scale:s,cx,cy | scale:sx,sy,cx,cy
/// hflip   vflip                   translate:dx,dy
/// translate-polar:angle,distance
/// fast-contrast:k   safe-contrast:n   luminance-contrast:k
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TransformRecipe {
    Bulge { x: f64, y: f64, scale: f64, radius: f64 },
    Swirl { x: f64, y: f64, turn: f64, radius: f64 },
    Firework { x: f64, y: f64, scale: f64, radius: f64, spokes: u32 },
    Scale { sx: f64, sy: f64, center_x: f64, center_y: f64 },
    HorizontalFlip,
    VerticalFlip,
    Translate { dx: f64, dy: f64 },
    TranslatePolar { angle: f64, distance: f64 },
    FastContrast { intensity: f64 },
    SafeContrast { intensity: i64 },
    LuminanceContrast { intensity: f64 },
}

impl TransformRecipe {
    /// Validates the parameters and constructs the transformer.
    pub fn build(&self) -> Result<Box<dyn Transformer>> {
        let transformer: Box<dyn Transformer> = match *self {
            Self::Bulge { x, y, scale, radius } => {
                Box::new(Bulge::new(x, y, scale, radius)?.for_each())
            }
            Self::Swirl { x, y, turn, radius } => {
                Box::new(Swirl::new(x, y, turn, radius)?.for_each())
            }
            Self::Firework {
                x,
                y,
                scale,
                radius,
                spokes,
            } => Box::new(Firework::new(x, y, scale, radius, spokes)?.for_each()),
            Self::Scale {
                sx,
                sy,
                center_x,
                center_y,
            } => Box::new(Scale::new(sx, sy, center_x, center_y)?.for_each()),
            Self::HorizontalFlip => Box::new(HorizontalFlip.for_each()),
            Self::VerticalFlip => Box::new(VerticalFlip.for_each()),
            Self::Translate { dx, dy } => Box::new(Translate::new(dx, dy)?),
            Self::TranslatePolar { angle, distance } => {
                Box::new(Translate::polar(angle, distance)?)
            }
            Self::FastContrast { intensity } => {
                Box::new(FastContrast::new(intensity)?.for_each())
            }
            Self::SafeContrast { intensity } => {
                Box::new(SafeContrast::new(intensity)?.for_each())
            }
            Self::LuminanceContrast { intensity } => {
                Box::new(LuminanceContrast::new(intensity)?.for_each())
            }
        };
        Ok(transformer)
    }
}

impl FromStr for TransformRecipe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, rest) = match s.split_once(':') {
            Some((name, rest)) => (name.trim(), Some(rest)),
            None => (s.trim(), None),
        };

        let args: Vec<f64> = match rest {
            Some(rest) => rest
                .split(',')
                .map(|arg| {
                    arg.trim()
                        .parse::<f64>()
                        .map_err(|e| Error::recipe(s, format!("`{}`: {e}", arg.trim())))
                })
                .collect::<Result<_>>()?,
            None => Vec::new(),
        };

        let arity = |expected: &[usize]| -> Result<()> {
            if expected.contains(&args.len()) {
                Ok(())
            } else {
                Err(Error::recipe(
                    s,
                    format!(
                        "{name} takes {expected:?} arguments, got {}",
                        args.len()
                    ),
                ))
            }
        };

        let integer = |value: f64| -> Result<i64> {
            if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                Ok(value as i64)
            } else {
                Err(Error::recipe(s, format!("{value} is not an integer")))
            }
        };

        let recipe = match name.to_ascii_lowercase().as_str() {
            "bulge" => {
                arity(&[4])?;
                Self::Bulge {
                    x: args[0],
                    y: args[1],
                    scale: args[2],
                    radius: args[3],
                }
            }
            "swirl" => {
                arity(&[4])?;
                Self::Swirl {
                    x: args[0],
                    y: args[1],
                    turn: args[2],
                    radius: args[3],
                }
            }
            "firework" => {
                arity(&[5])?;
                let spokes = u32::try_from(integer(args[4])?)
                    .map_err(|_| Error::recipe(s, "spokes must be a non-negative integer"))?;
                Self::Firework {
                    x: args[0],
                    y: args[1],
                    scale: args[2],
                    radius: args[3],
                    spokes,
                }
            }
            "scale" => {
                arity(&[1, 3, 4])?;
                match args[..] {
                    [factor] => Self::Scale {
                        sx: factor,
                        sy: factor,
                        center_x: 0.0,
                        center_y: 0.0,
                    },
                    [factor, cx, cy] => Self::Scale {
                        sx: factor,
                        sy: factor,
                        center_x: cx,
                        center_y: cy,
                    },
                    [sx, sy, cx, cy] => Self::Scale {
                        sx,
                        sy,
                        center_x: cx,
                        center_y: cy,
                    },
                    _ => unreachable!("arity checked"),
                }
            }
            "hflip" | "horizontal-flip" => {
                arity(&[0])?;
                Self::HorizontalFlip
            }
            "vflip" | "vertical-flip" => {
                arity(&[0])?;
                Self::VerticalFlip
            }
            "translate" => {
                arity(&[2])?;
                Self::Translate {
                    dx: args[0],
                    dy: args[1],
                }
            }
            "translate-polar" => {
                arity(&[2])?;
                Self::TranslatePolar {
                    angle: args[0],
                    distance: args[1],
                }
            }
            "fast-contrast" | "contrast" => {
                arity(&[1])?;
                Self::FastContrast {
                    intensity: args[0],
                }
            }
            "safe-contrast" => {
                arity(&[1])?;
                Self::SafeContrast {
                    intensity: integer(args[0])?,
                }
            }
            "luminance-contrast" => {
                arity(&[1])?;
                Self::LuminanceContrast {
                    intensity: args[0],
                }
            }
            other => return Err(Error::recipe(s, format!("unknown transform `{other}`"))),
        };

        Ok(recipe)
    }
}

impl fmt::Display for TransformRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bulge { x, y, scale, radius } => write!(f, "bulge:{x},{y},{scale},{radius}"),
            Self::Swirl { x, y, turn, radius } => write!(f, "swirl:{x},{y},{turn},{radius}"),
            Self::Firework {
                x,
                y,
                scale,
                radius,
                spokes,
            } => write!(f, "firework:{x},{y},{scale},{radius},{spokes}"),
            Self::Scale {
                sx,
                sy,
                center_x,
                center_y,
            } => write!(f, "scale:{sx},{sy},{center_x},{center_y}"),
            Self::HorizontalFlip => f.write_str("hflip"),
            Self::VerticalFlip => f.write_str("vflip"),
            Self::Translate { dx, dy } => write!(f, "translate:{dx},{dy}"),
            Self::TranslatePolar { angle, distance } => {
                write!(f, "translate-polar:{angle},{distance}")
            }
            Self::FastContrast { intensity } => write!(f, "fast-contrast:{intensity}"),
            Self::SafeContrast { intensity } => write!(f, "safe-contrast:{intensity}"),
            Self::LuminanceContrast { intensity } => write!(f, "luminance-contrast:{intensity}"),
        }
    }
}

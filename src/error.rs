pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("dimension mismatch: expected {}x{}, got {}x{}", expected.0, expected.1, actual.0, actual.1)]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("invalid transform recipe `{recipe}`: {reason}")]
    Recipe { recipe: String, reason: String },
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_frame(msg: impl Into<String>) -> Self {
        Self::InvalidFrame(msg.into())
    }

    pub fn recipe(recipe: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Recipe {
            recipe: recipe.into(),
            reason: reason.into(),
        }
    }
}

/// Fails with [`Error::Configuration`] unless every value is finite.
pub(crate) fn ensure_finite(what: &str, values: &[f64]) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Error::configuration(format!(
            "{what} parameters must be finite, got {values:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(Error::configuration("x")
            .to_string()
            .starts_with("configuration error:"));
        assert!(Error::invalid_frame("x")
            .to_string()
            .starts_with("invalid frame:"));
        assert!(Error::recipe("blorp", "unknown")
            .to_string()
            .contains("`blorp`"));
    }

    #[test]
    fn dimension_mismatch_names_both_sizes() {
        let err = Error::DimensionMismatch {
            expected: (640, 480),
            actual: (320, 240),
        };
        assert_eq!(
            err.to_string(),
            "dimension mismatch: expected 640x480, got 320x240"
        );
    }

    #[test]
    fn ensure_finite_rejects_nan_and_infinity() {
        assert!(ensure_finite("bulge", &[1.0, 2.0]).is_ok());
        assert!(ensure_finite("bulge", &[f64::NAN]).is_err());
        assert!(ensure_finite("bulge", &[1.0, f64::INFINITY]).is_err());
    }
}

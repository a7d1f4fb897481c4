//! Error types for Sylvan.

use thiserror::Error;

/// Top-level error type for Sylvan operations.
#[derive(Debug, Error)]
pub enum SylvanError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid actor or scenario configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A health fraction outside the open interval (0, 1)
    #[error("{field} must lie in (0, 1), got {value}")]
    ThresholdOutOfRange {
        /// Field name
        field: &'static str,
        /// Value found
        value: f32,
    },

    /// A negative or non-finite speed, range, duration, or amount
    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidMagnitude {
        /// Field name
        field: &'static str,
        /// Value found
        value: f32,
    },

    /// A value that must be strictly positive
    #[error("{field} must be positive, got {value}")]
    NotPositive {
        /// Field name
        field: &'static str,
        /// Value found
        value: f32,
    },

    /// Inverted min/max pair
    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange {
        /// Field name
        field: &'static str,
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },
}

impl ConfigError {
    /// Checks that `value` is a fraction in the open interval (0, 1).
    pub fn check_threshold(field: &'static str, value: f32) -> Result<(), Self> {
        if value > 0.0 && value < 1.0 {
            Ok(())
        } else {
            Err(Self::ThresholdOutOfRange { field, value })
        }
    }

    /// Checks that `value` is finite and non-negative.
    pub fn check_magnitude(field: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(Self::InvalidMagnitude { field, value })
        }
    }

    /// Checks that `value` is finite and strictly positive.
    pub fn check_positive(field: &'static str, value: f32) -> Result<(), Self> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(Self::NotPositive { field, value })
        }
    }
}

/// Result type alias for Sylvan operations.
pub type SylvanResult<T> = Result<T, SylvanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds_are_exclusive() {
        assert!(ConfigError::check_threshold("t", 0.5).is_ok());
        assert!(ConfigError::check_threshold("t", 0.0).is_err());
        assert!(ConfigError::check_threshold("t", 1.0).is_err());
        assert!(ConfigError::check_threshold("t", f32::NAN).is_err());
    }

    #[test]
    fn test_magnitude_rejects_negative_and_infinite() {
        assert!(ConfigError::check_magnitude("m", 0.0).is_ok());
        assert!(ConfigError::check_magnitude("m", -1.0).is_err());
        assert!(ConfigError::check_magnitude("m", f32::INFINITY).is_err());
    }
}

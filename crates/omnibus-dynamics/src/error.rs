//! Error types for controller construction.

use std::fmt;

/// Errors reported when a vehicle configuration fails validation.
///
/// These are construction-time failures: a controller built from an invalid
/// configuration would silently produce a non-physical simulation (division
/// by zero in the suspension, an empty lean-speed band), so
/// [`crate::VehicleController::new`] refuses to start instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A field that must be strictly positive is zero or negative.
    NonPositive { field: &'static str, value: f32 },
    /// The body-lean speed band is empty or inverted.
    LeanBandEmpty { min: f32, max: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "configuration field `{field}` must be positive, got {value}")
            }
            Self::LeanBandEmpty { min, max } => {
                write!(
                    f,
                    "body-lean speed band is empty: min_lean_speed {min} >= max_lean_speed {max}"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Result type for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

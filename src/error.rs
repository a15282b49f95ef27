//! Error types for physdemo.
//!
//! Library functions return `Result<T, SimError>` instead of panicking.
//! Note that a running simulation never surfaces these to the user: the
//! loop converts a Jidoka violation into a `Stopped` lifecycle and carries on.

use thiserror::Error;

/// Result type alias for physdemo operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for all physdemo operations.
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Jidoka Violations =====
    /// Numerical instability detected (NaN or Inf).
    #[error("Jidoka: non-finite value detected at {location}")]
    NonFiniteValue {
        /// Location where the non-finite value was detected.
        location: String,
    },

    // ===== Parameter Errors =====
    /// A parameter outside its physically meaningful domain.
    #[error("Invalid parameter '{name}': {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Offending value.
        value: f64,
        /// Why the value is rejected.
        reason: String,
    },

    /// Requested demo kind does not exist.
    #[error("Unknown demo '{0}'")]
    UnknownDemo(String),

    // ===== Configuration Errors =====
    /// Invalid configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Create a non-finite value error for a state location.
    #[must_use]
    pub fn non_finite(location: impl Into<String>) -> Self {
        Self::NonFiniteValue {
            location: location.into(),
        }
    }

    /// Check if this error is a Jidoka violation (requires immediate stop).
    #[must_use]
    pub const fn is_jidoka_violation(&self) -> bool {
        matches!(self, Self::NonFiniteValue { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jidoka_violation_detection() {
        let non_finite = SimError::non_finite("state.velocity");
        assert!(non_finite.is_jidoka_violation());

        let config = SimError::config("invalid");
        assert!(!config.is_jidoka_violation());

        let param = SimError::invalid_parameter("mass", 0.0, "must be positive");
        assert!(!param.is_jidoka_violation());
    }

    #[test]
    fn test_error_non_finite_display() {
        let err = SimError::non_finite("state.theta");
        let msg = err.to_string();
        assert!(msg.contains("non-finite value"));
        assert!(msg.contains("state.theta"));
    }

    #[test]
    fn test_error_config() {
        let err = SimError::config("schema_version must not be empty");
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("schema_version"));
    }

    #[test]
    fn test_error_invalid_parameter_display() {
        let err = SimError::invalid_parameter("spring_constant", -1.0, "must be positive");
        let msg = err.to_string();
        assert!(msg.contains("spring_constant"));
        assert!(msg.contains("-1"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_error_unknown_demo() {
        let err = SimError::UnknownDemo("trebuchet".to_string());
        assert!(err.to_string().contains("trebuchet"));
    }

    #[test]
    fn test_error_from_yaml() {
        let yaml_err = serde_yaml::from_str::<f64>("[not a number").unwrap_err();
        let err: SimError = yaml_err.into();
        assert!(err.to_string().contains("YAML parsing error"));
    }

    #[test]
    fn test_error_debug() {
        let err = SimError::config("test");
        let debug = format!("{err:?}");
        assert!(debug.contains("Config"));
    }
}

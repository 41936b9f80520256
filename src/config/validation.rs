//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, speeds above their floors)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TesterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted by the engine

use crate::config::schema::{ProbeConfig, TesterConfig};

/// Lowest accepted HTTP throughput floor (KB/s).
pub const MIN_DOWNLOAD_SPEED_FLOOR: f64 = 0.1;

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human readable description.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a whole configuration file.
pub fn validate_config(config: &ProbeConfig) -> Result<(), Vec<ValidationError>> {
    validate_tester(&config.tester)
}

/// Validate the probing engine settings.
pub fn validate_tester(config: &TesterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.concurrency < 1 {
        errors.push(ValidationError::new("tester.concurrency", "must be at least 1"));
    }

    if config.min_download_speed.is_nan() || config.min_download_speed < MIN_DOWNLOAD_SPEED_FLOOR {
        errors.push(ValidationError::new(
            "tester.min_download_speed",
            format!("must be at least {} KB/s", MIN_DOWNLOAD_SPEED_FLOOR),
        ));
    }

    if config.min_udp_download_speed.is_nan() || config.min_udp_download_speed < 0.0 {
        errors.push(ValidationError::new(
            "tester.min_udp_download_speed",
            "must not be negative",
        ));
    }

    for (field, value) in [
        ("tester.timeout", config.timeout),
        ("tester.http_timeout", config.http_timeout),
        ("tester.udp_timeout", config.udp_timeout),
        ("tester.max_http_latency_ms", config.max_http_latency_ms),
        ("tester.max_udp_latency_ms", config.max_udp_latency_ms),
    ] {
        if !value.is_finite() || value <= 0.0 {
            errors.push(ValidationError::new(field, "must be a positive number"));
        }
    }

    if config.max_download_size == 0 {
        errors.push(ValidationError::new("tester.max_download_size", "must be at least 1 byte"));
    }

    if config.max_channels_per_host == 0 {
        errors.push(ValidationError::new("tester.max_channels_per_host", "must be at least 1"));
    }

    if config.max_failures_per_host == 0 {
        errors.push(ValidationError::new("tester.max_failures_per_host", "must be at least 1"));
    }

    if !config.min_host_interval.is_finite() || config.min_host_interval < 0.0 {
        errors.push(ValidationError::new(
            "tester.min_host_interval",
            "must be a non-negative number of seconds",
        ));
    }

    if config.chunk_size == 0 {
        errors.push(ValidationError::new("tester.chunk_size", "must be at least 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProbeConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let config = TesterConfig {
            concurrency: 0,
            min_download_speed: 0.01,
            http_timeout: -1.0,
            max_udp_latency_ms: f64::NAN,
            max_failures_per_host: 0,
            ..TesterConfig::default()
        };

        let errors = validate_tester(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "tester.concurrency",
                "tester.min_download_speed",
                "tester.http_timeout",
                "tester.max_udp_latency_ms",
                "tester.max_failures_per_host",
            ]
        );
    }

    #[test]
    fn test_zero_host_interval_is_allowed() {
        let config = TesterConfig {
            min_host_interval: 0.0,
            ..TesterConfig::default()
        };
        assert!(validate_tester(&config).is_ok());
    }
}

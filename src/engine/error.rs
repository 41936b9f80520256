//! Engine error definitions.

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Errors that can stop a run or prevent an engine from being built.
///
/// Individual probe failures are never errors; they end up as
/// `offline` endpoints.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The tester configuration failed validation.
    #[error("invalid tester configuration: {}", join(.0))]
    InvalidConfig(Vec<ValidationError>),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The admission gate was closed while a probe waited for a slot.
    #[error("admission gate closed")]
    GateClosed,

    /// The run was aborted; endpoints evaluated so far keep their status.
    #[error("run aborted after {evaluated} endpoints")]
    Aborted { evaluated: usize },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate_tester;
    use crate::config::TesterConfig;

    #[test]
    fn test_error_display() {
        let err = EngineError::Aborted { evaluated: 42 };
        assert_eq!(err.to_string(), "run aborted after 42 endpoints");

        let config = TesterConfig {
            concurrency: 0,
            ..TesterConfig::default()
        };
        let err = EngineError::InvalidConfig(validate_tester(&config).unwrap_err());
        assert_eq!(
            err.to_string(),
            "invalid tester configuration: tester.concurrency: must be at least 1"
        );
    }
}

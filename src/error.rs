//! Error types for pruning setup

use thiserror::Error;

/// Errors surfaced while validating pruning configuration.
///
/// All variants are configuration errors: they abort setup before any
/// training step is processed. The masking path itself is deterministic
/// numeric computation with no recoverable failure modes.
#[derive(Debug, Error)]
pub enum PruneError {
    #[error("invalid schedule: start_step ({start_step}) must be less than end_step ({end_step})")]
    InvalidStepRange { start_step: usize, end_step: usize },

    #[error("end_step is unset; supply a valid end_step before training")]
    EndStepUnset,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid prunable_params pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Result type for pruning operations
pub type Result<T> = std::result::Result<T, PruneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_range_message_names_both_steps() {
        let err = PruneError::InvalidStepRange {
            start_step: 10,
            end_step: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_pattern_error_from_regex() {
        let err: PruneError = regex::Regex::new("(unclosed").unwrap_err().into();
        assert!(matches!(err, PruneError::InvalidPattern(_)));
    }
}

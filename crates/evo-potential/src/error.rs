//! Error types for potential configuration.

use evo_core::EvoError;
use thiserror::Error;

/// Errors raised while resolving potentials into a force table.
///
/// All of these are configuration errors: they are detected before any
/// orbit is integrated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PotentialError {
    #[error("Potential not supported by the compiled force table: {what}")]
    Unsupported { what: String },

    #[error("Malformed parameter block for {kind}: expected {expected} values, got {got}")]
    MalformedParameters {
        kind: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Unknown potential tag: {tag}")]
    UnknownTag { tag: i32 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type PotentialResult<T> = Result<T, PotentialError>;

impl From<PotentialError> for EvoError {
    fn from(e: PotentialError) -> Self {
        match e {
            PotentialError::Unsupported { .. } => EvoError::InvalidArg {
                what: "unsupported potential",
            },
            PotentialError::MalformedParameters { .. } => EvoError::InvalidArg {
                what: "malformed potential parameters",
            },
            PotentialError::UnknownTag { .. } => EvoError::InvalidArg {
                what: "unknown potential tag",
            },
            PotentialError::InvalidArg { what } => EvoError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PotentialError::MalformedParameters {
            kind: "DehnenBar",
            expected: 7,
            got: 6,
        };
        let msg = err.to_string();
        assert!(msg.contains("DehnenBar"));
        assert!(msg.contains("expected 7"));
    }

    #[test]
    fn error_conversion() {
        let err: EvoError = PotentialError::UnknownTag { tag: 99 }.into();
        assert!(matches!(err, EvoError::InvalidArg { .. }));
    }
}

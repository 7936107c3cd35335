//! Error types for evolved-DF moment estimation.

use evo_core::EvoError;
use evo_orbit::OrbitError;
use evo_potential::PotentialError;
use thiserror::Error;

/// Coarse classification of [`EdfError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad inputs: potentials, options, grid reuse.
    Configuration,
    /// An orbit could not be integrated.
    Integration,
    /// A numerical tolerance could not be met.
    Tolerance,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EdfError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Grid does not match the query: {what}")]
    GridMismatch { what: String },

    #[error("Orbit error: {0}")]
    Orbit(#[from] OrbitError),

    #[error("Tolerance not met: {0}")]
    Tolerance(String),

    #[error("Degraded grid: {failed} of {total} nodes failed")]
    DegradedGrid { failed: usize, total: usize },

    #[error("Numeric error: {0}")]
    Numeric(EvoError),
}

pub type EdfResult<T> = Result<T, EdfError>;

impl EdfError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EdfError::Configuration(_) | EdfError::GridMismatch { .. } => ErrorKind::Configuration,
            EdfError::Orbit(e) => match e {
                OrbitError::Configuration(_) | OrbitError::InvalidArg { .. } => {
                    ErrorKind::Configuration
                }
                OrbitError::IntegrationFailure { .. } => ErrorKind::Integration,
                OrbitError::ToleranceNotMet { .. } => ErrorKind::Tolerance,
            },
            EdfError::Tolerance(_) => ErrorKind::Tolerance,
            EdfError::DegradedGrid { .. } => ErrorKind::Integration,
            EdfError::Numeric(e) => match e {
                EvoError::InvalidArg { .. } => ErrorKind::Configuration,
                EvoError::NonFinite { .. } => ErrorKind::Integration,
                EvoError::ConvergenceFailed { .. } => ErrorKind::Tolerance,
            },
        }
    }
}

impl From<EvoError> for EdfError {
    fn from(e: EvoError) -> Self {
        match e {
            EvoError::ConvergenceFailed { .. } => EdfError::Tolerance(e.to_string()),
            other => EdfError::Numeric(other),
        }
    }
}

impl From<PotentialError> for EdfError {
    fn from(e: PotentialError) -> Self {
        EdfError::Configuration(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evo_core::PhaseState;

    #[test]
    fn error_kinds() {
        let failure = EdfError::from(OrbitError::IntegrationFailure {
            t: -1.0,
            state: PhaseState::new(1.0, 0.0, 1.0, 0.0),
        });
        assert_eq!(failure.kind(), ErrorKind::Integration);

        let conv = EdfError::from(EvoError::ConvergenceFailed {
            what: "test",
            estimate: 1.0,
            error: 0.1,
        });
        assert!(matches!(conv, EdfError::Tolerance(_)));
        assert_eq!(conv.kind(), ErrorKind::Tolerance);

        let cfg = EdfError::from(PotentialError::UnknownTag { tag: 5 });
        assert_eq!(cfg.kind(), ErrorKind::Configuration);
        assert_eq!(
            EdfError::DegradedGrid { failed: 1, total: 9 }.to_string(),
            "Degraded grid: 1 of 9 nodes failed"
        );
    }
}

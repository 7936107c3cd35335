//! Error types for orbit integration.

use evo_core::PhaseState;
use evo_potential::PotentialError;
use thiserror::Error;

/// Errors encountered while integrating an orbit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] PotentialError),

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Integration failure at t = {t}: non-finite state (last good state {state:?})")]
    IntegrationFailure { t: f64, state: PhaseState },

    #[error("Tolerance not met at t = {t} with step {step:e}")]
    ToleranceNotMet {
        t: f64,
        step: f64,
        state: PhaseState,
    },
}

pub type OrbitResult<T> = Result<T, OrbitError>;

//! Error type for the command-line front end.

use std::path::PathBuf;

use evo_moments::EdfError;
use evo_orbit::OrbitError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read scenario file: {path}")]
    ScenarioRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Evolved DF error: {0}")]
    Edf(#[from] EdfError),

    #[error("Orbit error: {0}")]
    Orbit(#[from] OrbitError),

    #[error("Output error: {0}")]
    Output(String),
}

pub type CliResult<T> = Result<T, CliError>;

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}

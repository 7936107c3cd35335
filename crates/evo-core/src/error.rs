use thiserror::Error;

pub type EvoResult<T> = Result<T, EvoError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvoError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Quadrature did not converge: {what} (estimate={estimate}, error={error})")]
    ConvergenceFailed {
        what: &'static str,
        estimate: f64,
        error: f64,
    },
}

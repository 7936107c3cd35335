//! evo-core: shared foundation for evodisk.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - quadrature (Simpson weights, adaptive Gauss-Kronrod)
//! - state (planar phase-space snapshot)
//! - units (natural-to-physical conversion via uom)
//! - timing (wall-clock timers reported through tracing)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod quadrature;
pub mod state;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{EvoError, EvoResult};
pub use numeric::*;
pub use quadrature::{
    AdaptiveOptions, QuadEstimate, gauss_kronrod, simpson_weights, trapezoid_weights,
};
pub use state::PhaseState;
pub use timing::Timer;
pub use units::NaturalUnits;

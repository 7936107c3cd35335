//! The initial distribution function boundary.

use evo_core::{EvoResult, PhaseState};

use crate::moments::{StaticQuadrature, static_moments};

/// Mean velocities and dispersions used to size a velocity window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityScales {
    pub mean_vr: f64,
    pub mean_vt: f64,
    pub sigma_r: f64,
    pub sigma_t: f64,
}

/// A steady-state planar distribution function `f(R, vR, vT)`.
///
/// Implementations must be pure; one instance is shared by all orbit
/// workers evaluating a grid.
pub trait InitialDf: Send + Sync {
    /// DF value at a phase-space point.
    fn eval(&self, r: f64, vr: f64, vt: f64) -> f64;

    fn eval_state(&self, s: &PhaseState) -> f64 {
        self.eval(s.r, s.vr, s.vt)
    }

    /// Target radial velocity dispersion squared.
    fn target_sigma_r2(&self, r: f64) -> f64;

    /// Circular velocity of the potential the DF is in equilibrium with.
    fn circular_velocity(&self, r: f64) -> f64;

    /// Velocity scales at `r`, by default from the DF's own static moments.
    fn velocity_scales(&self, r: f64) -> EvoResult<VelocityScales> {
        Ok(static_moments(self, r, &StaticQuadrature::default())?.scales())
    }
}

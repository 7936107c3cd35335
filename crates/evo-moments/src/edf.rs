//! The evolved disk DF: an initial DF carried forward through a potential.

use evo_core::PhaseState;
use evo_df::InitialDf;
use evo_orbit::{IntegrationOptions, OrbitError, integrate_compiled};
use evo_potential::{ForceTable, Potential};
use rayon::prelude::*;

use crate::error::{EdfError, EdfResult};
use crate::options::EvalPoint;

/// Velocity-space rectangle sampled at one evaluation point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VelocityWindow {
    pub vr_min: f64,
    pub vr_max: f64,
    pub vt_min: f64,
    pub vt_max: f64,
}

/// Result of one backward integration: the state at `t0` and the initial DF
/// there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeValue {
    pub initial: PhaseState,
    pub df: f64,
}

/// Distribution function at time `t` of a population that was in steady state
/// `initdf` at time `t0`, evolved in `potentials`.
///
/// `f(R, vR, vT, phi, t) = initdf(orbit integrated back from t to t0)`.
pub struct EvolvedDiskDf<D> {
    pub(crate) initdf: D,
    pub(crate) table: ForceTable,
    pub(crate) t0: f64,
    pub(crate) integration: IntegrationOptions,
    pub(crate) strict: bool,
}

impl<D: InitialDf> EvolvedDiskDf<D> {
    /// Compile the potentials and validate the integration options.
    pub fn new(
        initdf: D,
        potentials: &[Potential],
        t0: f64,
        integration: IntegrationOptions,
    ) -> EdfResult<Self> {
        if !t0.is_finite() {
            return Err(EdfError::Configuration(format!("t0 must be finite, got {t0}")));
        }
        let table = ForceTable::compile(potentials)?;
        integration.validate()?;
        Ok(Self {
            initdf,
            table,
            t0,
            integration,
            strict: false,
        })
    }

    /// Fail instead of warning when a grid contains failed orbits.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn t0(&self) -> f64 {
        self.t0
    }

    pub fn initial_df(&self) -> &D {
        &self.initdf
    }

    pub fn force_table(&self) -> &ForceTable {
        &self.table
    }

    pub fn integration(&self) -> &IntegrationOptions {
        &self.integration
    }

    /// Evolved DF at a single phase-space point.
    ///
    /// At `t == t0` the initial DF is evaluated without integrating.
    pub fn eval(&self, state: PhaseState, t: f64) -> EdfResult<f64> {
        Ok(self.backward(state, t)?.df)
    }

    pub(crate) fn backward(&self, state: PhaseState, t: f64) -> Result<NodeValue, OrbitError> {
        if t == self.t0 {
            return Ok(NodeValue {
                initial: state,
                df: self.initdf.eval_state(&state),
            });
        }
        let traj = integrate_compiled(&self.table, state, &[t, self.t0], &self.integration)?;
        let initial = traj.states.last().copied().unwrap_or(state);
        Ok(NodeValue {
            initial,
            df: self.initdf.eval_state(&initial),
        })
    }

    /// Evaluate many velocity nodes at one point in parallel.
    pub(crate) fn evaluate_nodes(
        &self,
        at: &EvalPoint,
        velocities: &[(f64, f64)],
    ) -> Vec<Result<NodeValue, OrbitError>> {
        velocities
            .par_iter()
            .map(|&(vr, vt)| self.backward(PhaseState::new(at.r, vr, vt, at.phi), at.t))
            .collect()
    }

    /// Window `mean +- nsigma sigma` from the initial DF's moments at `R`.
    pub fn velocity_window(&self, at: &EvalPoint, nsigma: f64) -> EdfResult<VelocityWindow> {
        let s = self.initdf.velocity_scales(at.r)?;
        if !(s.sigma_r > 0.0 && s.sigma_t > 0.0) {
            return Err(EdfError::Configuration(format!(
                "initial DF has no velocity spread at R = {}",
                at.r
            )));
        }
        Ok(VelocityWindow {
            vr_min: s.mean_vr - nsigma * s.sigma_r,
            vr_max: s.mean_vr + nsigma * s.sigma_r,
            vt_min: s.mean_vt - nsigma * s.sigma_t,
            vt_max: s.mean_vt + nsigma * s.sigma_t,
        })
    }
}

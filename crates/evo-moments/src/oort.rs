//! Derivative grids and Oort constants.

use evo_df::InitialDf;

use crate::edf::EvolvedDiskDf;
use crate::error::{EdfError, EdfResult};
use crate::grid::Grid;
use crate::moments::positive_mass;
use crate::options::{EvalPoint, GridOptions, OortOptions};

/// Coordinate a derivative grid pair is offset along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DerivAxis {
    R,
    Phi,
}

/// Grids at `x - delta` and `x + delta` along one axis.
#[derive(Clone, Debug)]
pub struct DerivativeGrid {
    pub axis: DerivAxis,
    pub delta: f64,
    pub minus: Grid,
    pub plus: Grid,
}

/// Everything needed for the four Oort constants at one point.
#[derive(Clone, Debug)]
pub struct OortGrids {
    pub grid: Grid,
    pub deriv_r: DerivativeGrid,
    pub deriv_phi: DerivativeGrid,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OortConstants {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub k: f64,
}

fn offset(at: &EvalPoint, axis: DerivAxis, d: f64) -> EvalPoint {
    match axis {
        DerivAxis::R => at.with_r(at.r + d),
        DerivAxis::Phi => at.with_phi(at.phi + d),
    }
}

/// `(mean vR, mean vT)` of a grid.
fn means(grid: &Grid) -> EdfResult<(f64, f64)> {
    let m00 = positive_mass(grid.raw_moment(0, 0), Some(grid), grid.at().r)?;
    Ok((grid.raw_moment(1, 0) / m00, grid.raw_moment(0, 1) / m00))
}

impl DerivativeGrid {
    /// Centred differences `(d mean_vr, d mean_vt)` along the axis.
    fn gradient(&self) -> EdfResult<(f64, f64)> {
        let (r_minus, t_minus) = means(&self.minus)?;
        let (r_plus, t_plus) = means(&self.plus)?;
        let h = 2.0 * self.delta;
        Ok(((r_plus - r_minus) / h, (t_plus - t_minus) / h))
    }

    fn check_matches(&self, at: &EvalPoint, axis: DerivAxis, t0: f64) -> EdfResult<()> {
        if self.axis != axis {
            return Err(EdfError::GridMismatch {
                what: format!("expected {axis:?} derivative grid, got {:?}", self.axis),
            });
        }
        self.minus.check_matches(&offset(at, axis, -self.delta), t0)?;
        self.plus.check_matches(&offset(at, axis, self.delta), t0)
    }
}

impl<D: InitialDf> EvolvedDiskDf<D> {
    /// Grids at `at` offset by `+- delta` along `axis`, built concurrently.
    pub fn derivative_grid(
        &self,
        at: &EvalPoint,
        axis: DerivAxis,
        delta: f64,
        opts: &GridOptions,
    ) -> EdfResult<DerivativeGrid> {
        if !(delta.is_finite() && delta > 0.0) {
            return Err(EdfError::Configuration(format!(
                "derivative offset must be positive, got {delta}"
            )));
        }
        let (minus, plus) = rayon::join(
            || self.velocity_grid(&offset(at, axis, -delta), opts),
            || self.velocity_grid(&offset(at, axis, delta), opts),
        );
        Ok(DerivativeGrid {
            axis,
            delta,
            minus: minus?,
            plus: plus?,
        })
    }

    /// Primary grid plus `R` and `phi` derivative grids.
    pub fn oort_grids(&self, at: &EvalPoint, opts: &OortOptions) -> EdfResult<OortGrids> {
        let grid = self.velocity_grid(at, &opts.grid)?;
        let deriv = opts.deriv_grid();
        let (deriv_r, deriv_phi) = rayon::join(
            || self.derivative_grid(at, DerivAxis::R, opts.delta_r, &deriv),
            || self.derivative_grid(at, DerivAxis::Phi, opts.delta_phi, &deriv),
        );
        Ok(OortGrids {
            grid,
            deriv_r: deriv_r?,
            deriv_phi: deriv_phi?,
        })
    }

    /// All four Oort constants from previously built grids.
    pub fn oort_constants(&self, at: &EvalPoint, grids: &OortGrids) -> EdfResult<OortConstants> {
        at.validate()?;
        grids.grid.check_matches(at, self.t0)?;
        grids.deriv_r.check_matches(at, DerivAxis::R, self.t0)?;
        grids.deriv_phi.check_matches(at, DerivAxis::Phi, self.t0)?;
        for g in [
            &grids.grid,
            &grids.deriv_r.minus,
            &grids.deriv_r.plus,
            &grids.deriv_phi.minus,
            &grids.deriv_phi.plus,
        ] {
            self.check_degraded(g)?;
        }

        let r = at.r;
        let (vr, vt) = means(&grids.grid)?;
        let (dvr_dr, dvt_dr) = grids.deriv_r.gradient()?;
        let (dvr_dphi, dvt_dphi) = grids.deriv_phi.gradient()?;
        Ok(OortConstants {
            a: 0.5 * (vt / r - dvt_dr - dvr_dphi / r),
            b: 0.5 * (-vt / r - dvt_dr + dvr_dphi / r),
            c: 0.5 * (-vr / r + dvr_dr - dvt_dphi / r),
            k: 0.5 * (vr / r + dvr_dr + dvt_dphi / r),
        })
    }

    pub fn oort_a(&self, at: &EvalPoint, grids: &OortGrids) -> EdfResult<f64> {
        Ok(self.oort_constants(at, grids)?.a)
    }

    pub fn oort_b(&self, at: &EvalPoint, grids: &OortGrids) -> EdfResult<f64> {
        Ok(self.oort_constants(at, grids)?.b)
    }

    pub fn oort_c(&self, at: &EvalPoint, grids: &OortGrids) -> EdfResult<f64> {
        Ok(self.oort_constants(at, grids)?.c)
    }

    pub fn oort_k(&self, at: &EvalPoint, grids: &OortGrids) -> EdfResult<f64> {
        Ok(self.oort_constants(at, grids)?.k)
    }
}

//! Velocity grids of backward-integrated orbits.

use evo_core::{PhaseState, Timer, Tolerances, linspace, nearly_equal, simpson_weights};
use evo_df::InitialDf;
use evo_orbit::OrbitError;
use nalgebra::{DMatrix, DVector};

use crate::edf::{EvolvedDiskDf, NodeValue, VelocityWindow};
use crate::error::{EdfError, EdfResult};
use crate::hierarchical::HierarchicalGrid;
use crate::options::{EvalPoint, GridOptions};

/// A grid node whose orbit could not be integrated. Its DF value is 0.
#[derive(Clone, Debug, PartialEq)]
pub struct FailedNode {
    pub vr: f64,
    pub vt: f64,
    pub error: OrbitError,
}

/// Square `(vR, vT)` lattice at one `(R, phi, t)`.
#[derive(Clone, Debug)]
pub struct VelocityGrid {
    pub at: EvalPoint,
    pub t0: f64,
    pub window: VelocityWindow,
    pub vr: Vec<f64>,
    pub vt: Vec<f64>,
    /// `df[(i, j)]` is the evolved DF at `(vr[i], vt[j])`
    pub df: DMatrix<f64>,
    /// Initial-epoch states, row-major like `df`; `None` for failed nodes
    pub initial: Vec<Option<PhaseState>>,
    pub failed: Vec<FailedNode>,
}

impl VelocityGrid {
    pub fn gridpoints(&self) -> usize {
        self.vr.len()
    }

    pub fn dvr(&self) -> f64 {
        (self.window.vr_max - self.window.vr_min) / (self.vr.len() - 1) as f64
    }

    pub fn dvt(&self) -> f64 {
        (self.window.vt_max - self.window.vt_min) / (self.vt.len() - 1) as f64
    }

    /// `sum_ij w_i w_j vR_i^n vT_j^m f_ij` with composite Simpson weights.
    pub fn raw_moment(&self, n: i32, m: i32) -> f64 {
        let wr = simpson_weights(self.vr.len(), self.dvr());
        let wt = simpson_weights(self.vt.len(), self.dvt());
        let a = DVector::from_iterator(
            self.vr.len(),
            self.vr.iter().zip(&wr).map(|(v, w)| v.powi(n) * w),
        );
        let b = DVector::from_iterator(
            self.vt.len(),
            self.vt.iter().zip(&wt).map(|(v, w)| v.powi(m) * w),
        );
        a.dot(&(&self.df * b))
    }
}

/// A velocity grid, flat or hierarchically refined.
#[derive(Clone, Debug)]
pub enum Grid {
    Flat(VelocityGrid),
    Hierarchical(HierarchicalGrid),
}

impl Grid {
    pub fn at(&self) -> &EvalPoint {
        &self.coarse().at
    }

    pub fn t0(&self) -> f64 {
        self.coarse().t0
    }

    /// The base lattice.
    pub fn coarse(&self) -> &VelocityGrid {
        match self {
            Grid::Flat(g) => g,
            Grid::Hierarchical(h) => &h.coarse,
        }
    }

    /// Raw velocity moment `int vR^n vT^m f dvR dvT`.
    pub fn raw_moment(&self, n: i32, m: i32) -> f64 {
        match self {
            Grid::Flat(g) => g.raw_moment(n, m),
            Grid::Hierarchical(h) => h.raw_moment(n, m),
        }
    }

    pub fn failed(&self) -> usize {
        match self {
            Grid::Flat(g) => g.failed.len(),
            Grid::Hierarchical(h) => h.coarse.failed.len() + h.failed.len(),
        }
    }

    pub fn total_nodes(&self) -> usize {
        match self {
            Grid::Flat(g) => g.df.len(),
            Grid::Hierarchical(h) => h.coarse.df.len() + h.fine.len(),
        }
    }

    /// Error if this grid was built for a different point or `t0`.
    pub fn check_matches(&self, at: &EvalPoint, t0: f64) -> EdfResult<()> {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-12,
        };
        let g = self.at();
        let same = nearly_equal(g.r, at.r, tol)
            && nearly_equal(g.phi, at.phi, tol)
            && nearly_equal(g.t, at.t, tol)
            && nearly_equal(self.t0(), t0, tol);
        if same {
            Ok(())
        } else {
            Err(EdfError::GridMismatch {
                what: format!(
                    "grid at {g:?} with t0 = {}, query at {at:?} with t0 = {t0}",
                    self.t0()
                ),
            })
        }
    }
}

impl<D: InitialDf> EvolvedDiskDf<D> {
    /// Integrate every node of a velocity grid at `at` back to `t0`.
    pub fn velocity_grid(&self, at: &EvalPoint, opts: &GridOptions) -> EdfResult<Grid> {
        at.validate()?;
        opts.validate()?;
        let timer = Timer::start("velocity grid");
        let coarse = self.flat_grid(at, opts)?;
        let grid = if opts.hierarchical {
            Grid::Hierarchical(self.refine(coarse, opts)?)
        } else {
            Grid::Flat(coarse)
        };
        let nodes = grid.total_nodes();
        let elapsed = timer.stop_and_log(nodes);
        tracing::debug!(
            r = at.r,
            phi = at.phi,
            t = at.t,
            nodes,
            failed = grid.failed(),
            elapsed_s = elapsed,
            "built velocity grid"
        );
        Ok(grid)
    }

    pub(crate) fn flat_grid(&self, at: &EvalPoint, opts: &GridOptions) -> EdfResult<VelocityGrid> {
        let lattice = self.lattice(at, opts)?;
        let results = self.evaluate_nodes(at, &lattice.velocities);
        Ok(self.assemble(at, &lattice, results))
    }

    /// Node velocities of the `gridpoints x gridpoints` lattice at `at.r`.
    pub(crate) fn lattice(&self, at: &EvalPoint, opts: &GridOptions) -> EdfResult<Lattice> {
        let n = opts.gridpoints;
        let window = self.velocity_window(at, opts.nsigma)?;
        let vr = linspace(window.vr_min, window.vr_max, n);
        let vt = linspace(window.vt_min, window.vt_max, n);
        let velocities = vr
            .iter()
            .flat_map(|&r| vt.iter().map(move |&t| (r, t)))
            .collect();
        Ok(Lattice {
            window,
            vr,
            vt,
            velocities,
        })
    }

    /// Grid at `at` from node results in `lattice.velocities` order.
    pub(crate) fn assemble(
        &self,
        at: &EvalPoint,
        lattice: &Lattice,
        results: Vec<Result<NodeValue, OrbitError>>,
    ) -> VelocityGrid {
        let n = lattice.vr.len();
        let mut df = DMatrix::zeros(n, n);
        let mut initial = Vec::with_capacity(n * n);
        let mut failed = Vec::new();
        for (k, (result, &(vr_k, vt_k))) in results.into_iter().zip(&lattice.velocities).enumerate()
        {
            match result {
                Ok(node) => {
                    df[(k / n, k % n)] = node.df;
                    initial.push(Some(node.initial));
                }
                Err(error) => {
                    initial.push(None);
                    failed.push(FailedNode {
                        vr: vr_k,
                        vt: vt_k,
                        error,
                    });
                }
            }
        }

        VelocityGrid {
            at: *at,
            t0: self.t0,
            window: lattice.window,
            vr: lattice.vr.clone(),
            vt: lattice.vt.clone(),
            df,
            initial,
            failed,
        }
    }
}

/// Velocity nodes of a flat grid, row-major in `(vr, vt)`.
pub(crate) struct Lattice {
    pub window: VelocityWindow,
    pub vr: Vec<f64>,
    pub vt: Vec<f64>,
    pub velocities: Vec<(f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use evo_core::linspace;

    fn gaussian_grid(n: usize) -> VelocityGrid {
        let window = VelocityWindow {
            vr_min: -1.0,
            vr_max: 1.0,
            vt_min: 0.0,
            vt_max: 2.0,
        };
        let vr = linspace(window.vr_min, window.vr_max, n);
        let vt = linspace(window.vt_min, window.vt_max, n);
        let df = DMatrix::from_fn(n, n, |i, j| {
            let (x, y) = (vr[i], vt[j] - 1.0);
            (-(x * x + y * y) / (2.0 * 0.2 * 0.2)).exp()
        });
        VelocityGrid {
            at: EvalPoint::new(1.0, 0.0, 0.0),
            t0: -1.0,
            window,
            vr,
            vt,
            df,
            initial: vec![None; n * n],
            failed: Vec::new(),
        }
    }

    #[test]
    fn simpson_moments_of_gaussian() {
        let g = gaussian_grid(41);
        let m00 = g.raw_moment(0, 0);
        let norm = 2.0 * std::f64::consts::PI * 0.04;
        assert!((m00 / norm - 1.0).abs() < 1e-4);
        assert!(g.raw_moment(1, 0).abs() < 1e-12);
        assert!((g.raw_moment(0, 1) / m00 - 1.0).abs() < 1e-6);
        assert!((g.raw_moment(2, 0) / m00 - 0.04).abs() < 1e-4);
    }

    #[test]
    fn mismatch_detected() {
        let grid = Grid::Flat(gaussian_grid(5));
        assert!(grid.check_matches(&EvalPoint::new(1.0, 0.0, 0.0), -1.0).is_ok());
        assert!(matches!(
            grid.check_matches(&EvalPoint::new(1.1, 0.0, 0.0), -1.0),
            Err(EdfError::GridMismatch { .. })
        ));
        assert!(grid.check_matches(&EvalPoint::new(1.0, 0.0, 0.0), -2.0).is_err());
    }
}

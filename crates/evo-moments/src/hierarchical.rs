//! Hierarchical velocity grids.
//!
//! Cells of the coarse lattice that carry a large share of the DF weight are
//! subdivided into `s x s` Simpson sub-grids. All sub-grids lie on one global
//! fine lattice with `(N - 1)(s - 1) + 1` nodes per axis, so nodes shared by
//! neighbouring cells (and by the coarse lattice) are integrated once.

use std::collections::{BTreeMap, BTreeSet};

use evo_core::{simpson_weights, trapezoid_weights};
use evo_df::InitialDf;

use crate::edf::{EvolvedDiskDf, NodeValue};
use crate::error::EdfResult;
use crate::grid::{FailedNode, VelocityGrid};
use crate::options::GridOptions;

#[derive(Clone, Debug)]
pub struct HierarchicalGrid {
    pub coarse: VelocityGrid,
    pub subgridpoints: usize,
    /// Coarse cells `(i, j)` (lower-left corner index) that were refined
    pub refined: BTreeSet<(usize, usize)>,
    /// Nodes on the fine lattice that are not coarse nodes; failed ones hold
    /// `None`
    pub fine: BTreeMap<(usize, usize), Option<NodeValue>>,
    pub failed: Vec<FailedNode>,
}

impl HierarchicalGrid {
    fn step(&self) -> usize {
        self.subgridpoints - 1
    }

    fn fine_h(&self) -> (f64, f64) {
        let s = self.step() as f64;
        (self.coarse.dvr() / s, self.coarse.dvt() / s)
    }

    fn fine_velocity(&self, a: usize, b: usize) -> (f64, f64) {
        let (hr, ht) = self.fine_h();
        let w = &self.coarse.window;
        (w.vr_min + a as f64 * hr, w.vt_min + b as f64 * ht)
    }

    /// DF at fine-lattice node `(a, b)`.
    fn fine_df(&self, a: usize, b: usize) -> f64 {
        let s = self.step();
        if a % s == 0 && b % s == 0 {
            return self.coarse.df[(a / s, b / s)];
        }
        self.fine
            .get(&(a, b))
            .and_then(|v| v.as_ref().map(|n| n.df))
            .unwrap_or(0.0)
    }

    /// Number of refined cells.
    pub fn refined_cells(&self) -> usize {
        self.refined.len()
    }

    pub fn raw_moment(&self, n: i32, m: i32) -> f64 {
        let g = &self.coarse;
        let cells = g.gridpoints() - 1;
        let (hr, ht) = (g.dvr(), g.dvt());
        let s = self.step();
        let (fhr, fht) = self.fine_h();
        let wr = simpson_weights(self.subgridpoints, fhr);
        let wt = simpson_weights(self.subgridpoints, fht);
        let (cr, ct) = (trapezoid_weights(2, hr), trapezoid_weights(2, ht));

        let mut total = 0.0;
        for i in 0..cells {
            for j in 0..cells {
                if self.refined.contains(&(i, j)) {
                    for (p, wp) in wr.iter().enumerate() {
                        for (q, wq) in wt.iter().enumerate() {
                            let (a, b) = (i * s + p, j * s + q);
                            let (vr, vt) = self.fine_velocity(a, b);
                            total += wp * wq * vr.powi(n) * vt.powi(m) * self.fine_df(a, b);
                        }
                    }
                } else {
                    for (di, wp) in cr.iter().enumerate() {
                        for (dj, wq) in ct.iter().enumerate() {
                            let (vr, vt) = (g.vr[i + di], g.vt[j + dj]);
                            total += wp * wq * vr.powi(n) * vt.powi(m) * g.df[(i + di, j + dj)];
                        }
                    }
                }
            }
        }
        total
    }
}

/// Cells whose corner-mean weight exceeds `fraction` of the total.
fn heavy_cells(g: &VelocityGrid, fraction: f64) -> BTreeSet<(usize, usize)> {
    let cells = g.gridpoints() - 1;
    let (wr, wt) = (trapezoid_weights(2, g.dvr()), trapezoid_weights(2, g.dvt()));
    let weight = |i: usize, j: usize| -> f64 {
        let mut w = 0.0;
        for (di, wp) in wr.iter().enumerate() {
            for (dj, wq) in wt.iter().enumerate() {
                w += wp * wq * g.df[(i + di, j + dj)];
            }
        }
        w
    };
    let total: f64 = (0..cells)
        .flat_map(|i| (0..cells).map(move |j| (i, j)))
        .map(|(i, j)| weight(i, j))
        .sum();
    if !(total > 0.0) {
        return BTreeSet::new();
    }
    (0..cells)
        .flat_map(|i| (0..cells).map(move |j| (i, j)))
        .filter(|&(i, j)| weight(i, j) > fraction * total)
        .collect()
}

impl<D: InitialDf> EvolvedDiskDf<D> {
    pub(crate) fn refine(
        &self,
        coarse: VelocityGrid,
        opts: &GridOptions,
    ) -> EdfResult<HierarchicalGrid> {
        let refined = heavy_cells(&coarse, opts.refine_fraction);
        let s = opts.subgridpoints - 1;

        let mut needed = BTreeSet::new();
        for &(i, j) in &refined {
            for a in i * s..=(i + 1) * s {
                for b in j * s..=(j + 1) * s {
                    if !(a % s == 0 && b % s == 0) {
                        needed.insert((a, b));
                    }
                }
            }
        }
        let needed: Vec<(usize, usize)> = needed.into_iter().collect();

        let mut grid = HierarchicalGrid {
            coarse,
            subgridpoints: opts.subgridpoints,
            refined,
            fine: BTreeMap::new(),
            failed: Vec::new(),
        };
        let velocities: Vec<(f64, f64)> = needed
            .iter()
            .map(|&(a, b)| grid.fine_velocity(a, b))
            .collect();
        let results = self.evaluate_nodes(&grid.coarse.at, &velocities);

        for ((key, result), &(vr, vt)) in needed.into_iter().zip(results).zip(&velocities) {
            match result {
                Ok(node) => {
                    grid.fine.insert(key, Some(node));
                }
                Err(error) => {
                    grid.fine.insert(key, None);
                    grid.failed.push(FailedNode { vr, vt, error });
                }
            }
        }
        tracing::debug!(
            refined_cells = grid.refined.len(),
            fine_nodes = grid.fine.len(),
            "refined velocity grid"
        );
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edf::VelocityWindow;
    use crate::options::EvalPoint;
    use evo_core::{PhaseState, linspace};
    use nalgebra::DMatrix;

    /// Cubic in each velocity, so Simpson sub-grids are exact and the
    /// trapezoid rule is not.
    fn cubic(vr: f64, vt: f64) -> f64 {
        1.0 + vr * vr + vt * vt * vt
    }

    fn cubic_integral() -> f64 {
        let (a, b, c, d): (f64, f64, f64, f64) = (-0.8, 0.8, 0.2, 1.8);
        let (lr, lt) = (b - a, d - c);
        lr * lt + lt * (b.powi(3) - a.powi(3)) / 3.0 + lr * (d.powi(4) - c.powi(4)) / 4.0
    }

    /// Hierarchical grid with an analytic DF in place of orbit integration.
    fn analytic_grid(n: usize, s: usize) -> HierarchicalGrid {
        let window = VelocityWindow {
            vr_min: -0.8,
            vr_max: 0.8,
            vt_min: 0.2,
            vt_max: 1.8,
        };
        let vr = linspace(window.vr_min, window.vr_max, n);
        let vt = linspace(window.vt_min, window.vt_max, n);
        let df = DMatrix::from_fn(n, n, |i, j| cubic(vr[i], vt[j]));
        let coarse = VelocityGrid {
            at: EvalPoint::new(1.0, 0.0, 0.0),
            t0: -1.0,
            window,
            vr,
            vt,
            df,
            initial: vec![None; n * n],
            failed: Vec::new(),
        };
        let refined = heavy_cells(&coarse, 1e-4);
        let mut grid = HierarchicalGrid {
            coarse,
            subgridpoints: s,
            refined,
            fine: BTreeMap::new(),
            failed: Vec::new(),
        };
        let nf = (n - 1) * (s - 1) + 1;
        for a in 0..nf {
            for b in 0..nf {
                if a % (s - 1) != 0 || b % (s - 1) != 0 {
                    let (x, y) = grid.fine_velocity(a, b);
                    let node = NodeValue {
                        initial: PhaseState::new(1.0, x, y, 0.0),
                        df: cubic(x, y),
                    };
                    grid.fine.insert((a, b), Some(node));
                }
            }
        }
        grid
    }

    #[test]
    fn refinement_improves_on_coarse_trapezoid() {
        let grid = analytic_grid(9, 3);
        // every cell carries well above 1e-4 of the weight
        assert_eq!(grid.refined_cells(), 64);
        let exact = cubic_integral();
        let refined = grid.raw_moment(0, 0);
        let unrefined = HierarchicalGrid {
            refined: BTreeSet::new(),
            ..grid.clone()
        }
        .raw_moment(0, 0);
        assert!((refined / exact - 1.0).abs() < 1e-12);
        assert!((unrefined / exact - 1.0).abs() > 1e-4);
        assert!(grid.raw_moment(1, 0).abs() < 1e-12);
    }

    #[test]
    fn fine_lattice_shares_coarse_nodes() {
        let grid = analytic_grid(5, 3);
        // coarse node (1, 2) is fine node (2, 4)
        assert_eq!(grid.fine_df(2, 4), grid.coarse.df[(1, 2)]);
        assert!(!grid.fine.contains_key(&(2, 4)));
        let (vr, vt) = grid.fine_velocity(2, 4);
        assert!((vr - grid.coarse.vr[1]).abs() < 1e-14);
        assert!((vt - grid.coarse.vt[2]).abs() < 1e-14);
    }

    #[test]
    fn empty_weight_refines_nothing() {
        let mut grid = analytic_grid(5, 3);
        grid.coarse.df.fill(0.0);
        assert!(heavy_cells(&grid.coarse, 1e-4).is_empty());
    }
}

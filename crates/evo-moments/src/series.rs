//! Grids and moments at one `(R, phi)` for a list of times.
//!
//! Every time shares the same velocity lattice, since the window depends on
//! `R` only. In a time-dependent potential the orbit through a phase point
//! depends on when it passes there, so each `(time, node)` pair has its own
//! backward integration. All pairs run as one parallel batch.

use evo_core::{PhaseState, Timer, Tolerances, nearly_equal};
use evo_df::InitialDf;
use rayon::prelude::*;

use crate::edf::EvolvedDiskDf;
use crate::error::{EdfError, EdfResult};
use crate::grid::Grid;
use crate::moments::{MomentSet, Sampling};
use crate::options::{DirectOptions, EvalPoint, GridOptions};

/// One velocity grid per requested time, in request order.
#[derive(Clone, Debug)]
pub struct GridSeries {
    pub grids: Vec<Grid>,
}

impl GridSeries {
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.grids.iter().map(|g| g.at().t).collect()
    }

    /// The grid built for time `t`, if any.
    pub fn grid_at(&self, t: f64) -> Option<&Grid> {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-12,
        };
        self.grids.iter().find(|g| nearly_equal(g.at().t, t, tol))
    }
}

/// How velocity space is sampled for a list of times.
#[derive(Clone, Copy, Debug)]
pub enum SeriesSampling<'a> {
    /// Build a series for this call and discard it.
    Build(GridOptions),
    /// Reuse a series built earlier; any subset of its times may be asked
    /// for.
    Grids(&'a GridSeries),
    /// Nested adaptive quadrature at each time.
    Direct(DirectOptions),
}

fn validate_times(times: &[f64]) -> EdfResult<()> {
    if times.is_empty() {
        return Err(EdfError::Configuration(
            "at least one time is required".to_string(),
        ));
    }
    if let Some(t) = times.iter().find(|t| !t.is_finite()) {
        return Err(EdfError::Configuration(format!("time must be finite, got {t}")));
    }
    for (i, &a) in times.iter().enumerate() {
        if times[i + 1..].contains(&a) {
            return Err(EdfError::Configuration(format!("time {a} is repeated")));
        }
    }
    Ok(())
}

impl<D: InitialDf> EvolvedDiskDf<D> {
    /// Velocity grids at `(r, phi)` for every time in `times`.
    pub fn grid_series(
        &self,
        r: f64,
        phi: f64,
        times: &[f64],
        opts: &GridOptions,
    ) -> EdfResult<GridSeries> {
        validate_times(times)?;
        let points: Vec<EvalPoint> = times.iter().map(|&t| EvalPoint::new(r, phi, t)).collect();
        for at in &points {
            at.validate()?;
        }
        opts.validate()?;
        let timer = Timer::start("grid series");

        let lattice = self.lattice(&points[0], opts)?;
        let per_grid = lattice.velocities.len();
        let mut results: Vec<_> = (0..points.len() * per_grid)
            .into_par_iter()
            .map(|k| {
                let at = &points[k / per_grid];
                let (vr, vt) = lattice.velocities[k % per_grid];
                self.backward(PhaseState::new(at.r, vr, vt, at.phi), at.t)
            })
            .collect();

        let mut coarse = Vec::with_capacity(points.len());
        for at in points.iter().rev() {
            let tail = results.split_off(results.len() - per_grid);
            coarse.push(self.assemble(at, &lattice, tail));
        }
        coarse.reverse();

        let grids = if opts.hierarchical {
            coarse
                .into_par_iter()
                .map(|g| self.refine(g, opts).map(Grid::Hierarchical))
                .collect::<EdfResult<Vec<_>>>()?
        } else {
            coarse.into_iter().map(Grid::Flat).collect()
        };

        let nodes: usize = grids.iter().map(Grid::total_nodes).sum();
        let failed: usize = grids.iter().map(Grid::failed).sum();
        let elapsed = timer.stop_and_log(nodes);
        tracing::debug!(
            r,
            phi,
            times = grids.len(),
            nodes,
            failed,
            elapsed_s = elapsed,
            "built grid series"
        );
        Ok(GridSeries { grids })
    }

    /// [`MomentSet`] at `(r, phi)` for every time in `times`, in order.
    pub fn moment_series(
        &self,
        r: f64,
        phi: f64,
        times: &[f64],
        sampling: SeriesSampling<'_>,
    ) -> EdfResult<Vec<MomentSet>> {
        validate_times(times)?;
        let built;
        let series = match sampling {
            SeriesSampling::Build(opts) => {
                built = self.grid_series(r, phi, times, &opts)?;
                &built
            }
            SeriesSampling::Grids(series) => series,
            SeriesSampling::Direct(opts) => {
                return times
                    .iter()
                    .map(|&t| self.moment_set(&EvalPoint::new(r, phi, t), Sampling::Direct(opts)))
                    .collect();
            }
        };
        times
            .iter()
            .map(|&t| {
                let grid = series.grid_at(t).ok_or_else(|| EdfError::GridMismatch {
                    what: format!("no grid for t = {t} in series at {:?}", series.times()),
                })?;
                self.moment_set(&EvalPoint::new(r, phi, t), Sampling::Grid(grid))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_or_missing_times_rejected() {
        assert!(validate_times(&[]).is_err());
        assert!(validate_times(&[0.0, -1.0, 0.0]).is_err());
        assert!(validate_times(&[0.0, f64::NAN]).is_err());
        assert!(validate_times(&[0.0, -10.0, -5.0]).is_ok());
    }
}

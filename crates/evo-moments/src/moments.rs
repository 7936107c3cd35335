//! Velocity moments of the evolved DF.
//!
//! Every operation resolves its [`Sampling`] once, so a moment that needs
//! lower moments (a dispersion needs the surface mass and a mean) builds at
//! most one grid.

use evo_core::{PhaseState, gauss_kronrod};
use evo_df::InitialDf;

use crate::edf::{EvolvedDiskDf, VelocityWindow};
use crate::error::{EdfError, EdfResult};
use crate::grid::Grid;
use crate::options::{DirectOptions, EvalPoint, GridOptions, KnownMoments};

/// How velocity space is sampled for a moment.
#[derive(Clone, Copy, Debug)]
pub enum Sampling<'a> {
    /// Build a grid for this call and discard it.
    Build(GridOptions),
    /// Reuse a grid built earlier for the same point.
    Grid(&'a Grid),
    /// Nested adaptive quadrature, no grid.
    Direct(DirectOptions),
}

impl Default for Sampling<'_> {
    fn default() -> Self {
        Sampling::Build(GridOptions::default())
    }
}

/// All moments at one point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MomentSet {
    pub surface_mass: f64,
    pub mean_vr: f64,
    pub mean_vt: f64,
    pub sigma_r2: f64,
    pub sigma_t2: f64,
    pub sigma_rt: f64,
    /// Degrees
    pub vertex_deviation: f64,
}

enum Source<'a> {
    Owned(Grid),
    Borrowed(&'a Grid),
    Direct {
        opts: DirectOptions,
        window: VelocityWindow,
    },
}

impl Source<'_> {
    fn grid(&self) -> Option<&Grid> {
        match self {
            Source::Owned(g) => Some(g),
            Source::Borrowed(g) => Some(*g),
            Source::Direct { .. } => None,
        }
    }
}

/// Vertex deviation in degrees: `1/2 atan2(2 sigma_RT, sigma_R^2 - sigma_T^2)`.
pub fn vertex_deviation_deg(sigma_r2: f64, sigma_t2: f64, sigma_rt: f64) -> f64 {
    (0.5 * (2.0 * sigma_rt).atan2(sigma_r2 - sigma_t2)).to_degrees()
}

/// Computed surface mass usable as a divisor.
///
/// A grid whose orbits failed reports [`EdfError::DegradedGrid`]; otherwise a
/// mass that is not finite and positive is a [`EdfError::Tolerance`] failure.
pub(crate) fn positive_mass(m00: f64, grid: Option<&Grid>, r: f64) -> EdfResult<f64> {
    if m00.is_finite() && m00 > 0.0 {
        return Ok(m00);
    }
    if let Some(g) = grid.filter(|g| g.failed() > 0) {
        return Err(EdfError::DegradedGrid {
            failed: g.failed(),
            total: g.total_nodes(),
        });
    }
    Err(EdfError::Tolerance(format!(
        "surface mass {m00} at R = {r} is not positive"
    )))
}

/// One resolved sampling and the lower moments found on it so far.
struct Session<'s, 'a, D> {
    edf: &'s EvolvedDiskDf<D>,
    at: &'s EvalPoint,
    source: Source<'a>,
    known: KnownMoments,
    /// Whether `known.surface_mass` was computed here rather than given.
    computed_mass: bool,
}

impl<D: InitialDf> Session<'_, '_, D> {
    fn raw(&self, n: i32, m: i32) -> EdfResult<f64> {
        match &self.source {
            Source::Owned(g) => Ok(g.raw_moment(n, m)),
            Source::Borrowed(g) => Ok(g.raw_moment(n, m)),
            Source::Direct { opts, window } => {
                self.edf.direct_moment(self.at, opts, window, n, m)
            }
        }
    }

    fn surface_mass(&mut self) -> EdfResult<f64> {
        if let Some(s) = self.known.surface_mass {
            return Ok(s);
        }
        let s = self.raw(0, 0)?;
        self.known.surface_mass = Some(s);
        self.computed_mass = true;
        Ok(s)
    }

    fn divisor(&mut self) -> EdfResult<f64> {
        let s = self.surface_mass()?;
        if self.computed_mass {
            positive_mass(s, self.source.grid(), self.at.r)
        } else {
            Ok(s)
        }
    }

    fn mean(&mut self, radial: bool) -> EdfResult<f64> {
        let given = if radial { self.known.mean_vr } else { self.known.mean_vt };
        if let Some(v) = given {
            return Ok(v);
        }
        let sm = self.divisor()?;
        let v = if radial {
            self.raw(1, 0)? / sm
        } else {
            self.raw(0, 1)? / sm
        };
        if radial {
            self.known.mean_vr = Some(v);
        } else {
            self.known.mean_vt = Some(v);
        }
        Ok(v)
    }

    fn second(&mut self, (n, m): (i32, i32)) -> EdfResult<f64> {
        let given = match (n, m) {
            (2, 0) => self.known.sigma_r2,
            (0, 2) => self.known.sigma_t2,
            _ => self.known.sigma_rt,
        };
        if let Some(v) = given {
            return Ok(v);
        }
        let sm = self.divisor()?;
        let a = if n > 0 { self.mean(true)? } else { 0.0 };
        let b = if m > 0 { self.mean(false)? } else { 0.0 };
        let raw = self.raw(n, m)? / sm;
        Ok(match (n, m) {
            (2, 0) => raw - a * a,
            (0, 2) => raw - b * b,
            _ => raw - a * b,
        })
    }
}

impl<D: InitialDf> EvolvedDiskDf<D> {
    fn session<'s, 'a>(
        &'s self,
        at: &'s EvalPoint,
        sampling: Sampling<'a>,
        known: &KnownMoments,
    ) -> EdfResult<Session<'s, 'a, D>> {
        at.validate()?;
        let source = match sampling {
            Sampling::Build(opts) => Source::Owned(self.velocity_grid(at, &opts)?),
            Sampling::Grid(grid) => {
                grid.check_matches(at, self.t0)?;
                Source::Borrowed(grid)
            }
            Sampling::Direct(opts) => Source::Direct {
                opts,
                window: self.velocity_window(at, opts.nsigma)?,
            },
        };
        if let Some(g) = source.grid() {
            self.check_degraded(g)?;
        }
        Ok(Session {
            edf: self,
            at,
            source,
            known: *known,
            computed_mass: false,
        })
    }

    pub(crate) fn check_degraded(&self, grid: &Grid) -> EdfResult<()> {
        let failed = grid.failed();
        if failed == 0 {
            return Ok(());
        }
        let total = grid.total_nodes();
        if self.strict {
            return Err(EdfError::DegradedGrid { failed, total });
        }
        tracing::warn!(failed, total, "velocity grid has failed orbits; moments are degraded");
        Ok(())
    }

    /// `int int vR^n vT^m f dvT dvR` by nested Gauss-Kronrod over `w`.
    fn direct_moment(
        &self,
        at: &EvalPoint,
        opts: &DirectOptions,
        w: &VelocityWindow,
        n: i32,
        m: i32,
    ) -> EdfResult<f64> {
        let adaptive = opts.adaptive();
        let outer = gauss_kronrod(
            |vr: f64| -> EdfResult<f64> {
                let inner = gauss_kronrod(
                    |vt: f64| -> EdfResult<f64> {
                        let f = self.eval(PhaseState::new(at.r, vr, vt, at.phi), at.t)?;
                        Ok(vr.powi(n) * vt.powi(m) * f)
                    },
                    w.vt_min,
                    w.vt_max,
                    &adaptive,
                )?;
                Ok(inner.value)
            },
            w.vr_min,
            w.vr_max,
            &adaptive,
        )?;
        Ok(outer.value)
    }

    /// Raw velocity moment `int vR^n vT^m f dvR dvT` at `at`.
    pub fn vmoment_surface_mass(
        &self,
        at: &EvalPoint,
        n: i32,
        m: i32,
        sampling: Sampling<'_>,
    ) -> EdfResult<f64> {
        self.session(at, sampling, &KnownMoments::default())?.raw(n, m)
    }

    pub fn surface_mass(
        &self,
        at: &EvalPoint,
        sampling: Sampling<'_>,
        known: &KnownMoments,
    ) -> EdfResult<f64> {
        if let Some(s) = known.surface_mass {
            return Ok(s);
        }
        self.session(at, sampling, known)?.surface_mass()
    }

    pub fn mean_vr(
        &self,
        at: &EvalPoint,
        sampling: Sampling<'_>,
        known: &KnownMoments,
    ) -> EdfResult<f64> {
        if let Some(v) = known.mean_vr {
            return Ok(v);
        }
        self.session(at, sampling, known)?.mean(true)
    }

    pub fn mean_vt(
        &self,
        at: &EvalPoint,
        sampling: Sampling<'_>,
        known: &KnownMoments,
    ) -> EdfResult<f64> {
        if let Some(v) = known.mean_vt {
            return Ok(v);
        }
        self.session(at, sampling, known)?.mean(false)
    }

    /// Radial velocity dispersion squared.
    pub fn sigma_r2(
        &self,
        at: &EvalPoint,
        sampling: Sampling<'_>,
        known: &KnownMoments,
    ) -> EdfResult<f64> {
        if let Some(v) = known.sigma_r2 {
            return Ok(v);
        }
        self.session(at, sampling, known)?.second((2, 0))
    }

    /// Tangential velocity dispersion squared.
    pub fn sigma_t2(
        &self,
        at: &EvalPoint,
        sampling: Sampling<'_>,
        known: &KnownMoments,
    ) -> EdfResult<f64> {
        if let Some(v) = known.sigma_t2 {
            return Ok(v);
        }
        self.session(at, sampling, known)?.second((0, 2))
    }

    /// Radial-tangential covariance.
    pub fn sigma_rt(
        &self,
        at: &EvalPoint,
        sampling: Sampling<'_>,
        known: &KnownMoments,
    ) -> EdfResult<f64> {
        if let Some(v) = known.sigma_rt {
            return Ok(v);
        }
        self.session(at, sampling, known)?.second((1, 1))
    }

    /// Vertex deviation in degrees.
    pub fn vertex_deviation(
        &self,
        at: &EvalPoint,
        sampling: Sampling<'_>,
        known: &KnownMoments,
    ) -> EdfResult<f64> {
        if let (Some(sr2), Some(st2), Some(srt)) = (known.sigma_r2, known.sigma_t2, known.sigma_rt)
        {
            return Ok(vertex_deviation_deg(sr2, st2, srt));
        }
        let mut session = self.session(at, sampling, known)?;
        let sr2 = session.second((2, 0))?;
        let st2 = session.second((0, 2))?;
        let srt = session.second((1, 1))?;
        Ok(vertex_deviation_deg(sr2, st2, srt))
    }

    /// Surface mass, means, dispersions and vertex deviation from one
    /// sampling pass.
    pub fn moment_set(&self, at: &EvalPoint, sampling: Sampling<'_>) -> EdfResult<MomentSet> {
        let session = self.session(at, sampling, &KnownMoments::default())?;
        session.moment_set()
    }
}

impl<D: InitialDf> Session<'_, '_, D> {
    fn moment_set(mut self) -> EdfResult<MomentSet> {
        let surface_mass = self.divisor()?;
        let mean_vr = self.mean(true)?;
        let mean_vt = self.mean(false)?;
        let sigma_r2 = self.second((2, 0))?;
        let sigma_t2 = self.second((0, 2))?;
        let sigma_rt = self.second((1, 1))?;
        Ok(MomentSet {
            surface_mass,
            mean_vr,
            mean_vt,
            sigma_r2,
            sigma_t2,
            sigma_rt,
            vertex_deviation: vertex_deviation_deg(sigma_r2, sigma_t2, sigma_rt),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_deviation_of_aligned_ellipse_is_zero() {
        assert_eq!(vertex_deviation_deg(0.04, 0.02, 0.0), 0.0);
        let tilted = vertex_deviation_deg(0.04, 0.02, 0.01);
        assert!((tilted - 22.5).abs() < 1e-12);
    }

    #[test]
    fn empty_mass_is_a_tolerance_failure() {
        for m00 in [0.0, -1e-3, f64::NAN] {
            let err = positive_mass(m00, None, 0.9).unwrap_err();
            assert!(matches!(err, EdfError::Tolerance(_)), "{m00}");
        }
        assert_eq!(positive_mass(0.25, None, 0.9).unwrap(), 0.25);
    }
}

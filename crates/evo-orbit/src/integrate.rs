//! Orbit integration over a list of output times.

use evo_core::PhaseState;
use evo_potential::{ForceTable, Potential};
use nalgebra::DMatrix;

use crate::error::{OrbitError, OrbitResult};
use crate::integrator::{Cartesian, Integrator, Leapfrog, Rk6, scaled_error};
use crate::model::OrbitModel;

/// Integration scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum IntegrationMethod {
    /// Adaptive sixth-order Runge-Kutta (default).
    #[default]
    Rk6,
    /// Symplectic leapfrog with a fixed step chosen once per orbit.
    Leapfrog,
}

/// Options for orbit integration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntegrationOptions {
    pub method: IntegrationMethod,
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Smallest step magnitude before giving up
    pub min_step: f64,
    /// Maximum number of attempted steps per orbit
    pub max_steps: usize,
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        Self {
            method: IntegrationMethod::default(),
            rtol: 1.49012e-10,
            atol: 0.0,
            min_step: 1e-12,
            max_steps: 1_000_000,
        }
    }
}

impl IntegrationOptions {
    pub fn validate(&self) -> OrbitResult<()> {
        let non_negative = self.rtol >= 0.0 && self.atol >= 0.0;
        if !non_negative || (self.rtol == 0.0 && self.atol == 0.0) {
            return Err(OrbitError::InvalidArg {
                what: "tolerances must be non-negative and not both zero",
            });
        }
        if self.min_step.is_nan() || self.min_step <= 0.0 {
            return Err(OrbitError::InvalidArg {
                what: "min_step must be positive",
            });
        }
        if self.max_steps == 0 {
            return Err(OrbitError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        Ok(())
    }
}

/// Work done while integrating one orbit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrationStats {
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub force_evaluations: usize,
}

/// Orbit sampled at the requested times.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub t: Vec<f64>,
    pub states: Vec<PhaseState>,
    pub stats: IntegrationStats,
}

impl Trajectory {
    /// State at the last requested time.
    pub fn last(&self) -> Option<&PhaseState> {
        self.states.last()
    }

    /// `nt x 4` matrix with rows `[R, vR, vT, phi]`.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.states.len(), 4, |i, j| self.states[i].to_array()[j])
    }
}

/// Integrate in a list of potentials. The list is compiled once.
pub fn integrate(
    pots: &[Potential],
    init: PhaseState,
    times: &[f64],
    opts: &IntegrationOptions,
) -> OrbitResult<Trajectory> {
    let table = ForceTable::compile(pots)?;
    integrate_compiled(&table, init, times, opts)
}

/// Integrate in an already compiled force table.
pub fn integrate_compiled(
    table: &ForceTable,
    init: PhaseState,
    times: &[f64],
    opts: &IntegrationOptions,
) -> OrbitResult<Trajectory> {
    integrate_model(table, init, times, opts)
}

/// Integrate in an arbitrary acceleration field.
///
/// `times` must be strictly monotonic, in either direction. The first row of
/// the trajectory is `init` unchanged, and a single time performs no steps.
pub fn integrate_model<M: OrbitModel + ?Sized>(
    model: &M,
    init: PhaseState,
    times: &[f64],
    opts: &IntegrationOptions,
) -> OrbitResult<Trajectory> {
    validate_times(times)?;
    opts.validate()?;
    if !init.is_finite() || init.r <= 0.0 {
        return Err(OrbitError::InvalidArg {
            what: "initial state must be finite with R > 0",
        });
    }

    let mut driver = Driver {
        model,
        opts,
        stats: IntegrationStats::default(),
        last_good: init,
    };
    let mut states = Vec::with_capacity(times.len());
    states.push(init);

    if times.len() > 1 {
        match opts.method {
            IntegrationMethod::Rk6 => driver.adaptive(&Rk6, init, times, &mut states)?,
            IntegrationMethod::Leapfrog => driver.fixed(&Leapfrog, init, times, &mut states)?,
        }
    }

    tracing::trace!(
        accepted = driver.stats.accepted_steps,
        rejected = driver.stats.rejected_steps,
        evaluations = driver.stats.force_evaluations,
        "orbit integrated"
    );

    Ok(Trajectory {
        t: times.to_vec(),
        states,
        stats: driver.stats,
    })
}

fn validate_times(times: &[f64]) -> OrbitResult<()> {
    if times.is_empty() {
        return Err(OrbitError::InvalidArg {
            what: "at least one output time is required",
        });
    }
    if times.iter().any(|t| !t.is_finite()) {
        return Err(OrbitError::InvalidArg {
            what: "output times must be finite",
        });
    }
    if times.len() > 1 {
        let sign = (times[1] - times[0]).signum();
        let monotonic = times
            .windows(2)
            .all(|w| w[1] != w[0] && (w[1] - w[0]).signum() == sign);
        if !monotonic {
            return Err(OrbitError::InvalidArg {
                what: "output times must be strictly monotonic",
            });
        }
    }
    Ok(())
}

struct Driver<'a, M: ?Sized> {
    model: &'a M,
    opts: &'a IntegrationOptions,
    stats: IntegrationStats,
    /// State after the last accepted step. Its `phi` is unwrapped and is the
    /// reference for the next conversion.
    last_good: PhaseState,
}

impl<M: OrbitModel + ?Sized> Driver<'_, M> {
    /// Take `y` at time `t` as the new last good state.
    fn accept(&mut self, t: f64, y: &Cartesian) -> OrbitResult<()> {
        self.check(t, y)?;
        let state = PhaseState::from_cartesian(*y, self.last_good.phi);
        if !state.is_finite() {
            return Err(self.failure(t));
        }
        self.last_good = state;
        Ok(())
    }

    fn failure(&self, t: f64) -> OrbitError {
        OrbitError::IntegrationFailure {
            t,
            state: self.last_good,
        }
    }

    fn check(&self, t: f64, y: &Cartesian) -> OrbitResult<()> {
        if y.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(self.failure(t))
        }
    }

    fn count_step(&mut self, t: f64, h: f64) -> OrbitResult<()> {
        if self.stats.accepted_steps + self.stats.rejected_steps >= self.opts.max_steps {
            return Err(OrbitError::ToleranceNotMet {
                t,
                step: h,
                state: self.last_good,
            });
        }
        Ok(())
    }

    /// One full step and two half steps from `(t, y)`.
    fn doubled<I: Integrator>(
        &mut self,
        integrator: &I,
        t: f64,
        y: &Cartesian,
        h: f64,
    ) -> OrbitResult<(Cartesian, f64)> {
        let coarse = integrator.step(self.model, t, y, h)?;
        let mid = integrator.step(self.model, t, y, 0.5 * h)?;
        let fine = integrator.step(self.model, t + 0.5 * h, &mid, 0.5 * h)?;
        self.stats.force_evaluations += 3 * I::EVALUATIONS;
        let err = scaled_error(y, &coarse, &fine, I::ORDER, self.opts.rtol, self.opts.atol);
        Ok((fine, err))
    }

    /// Step-doubling adaptive integration with the step carried across
    /// output intervals.
    fn adaptive<I: Integrator>(
        &mut self,
        integrator: &I,
        init: PhaseState,
        times: &[f64],
        states: &mut Vec<PhaseState>,
    ) -> OrbitResult<()> {
        let mut y = init.to_cartesian();
        let mut t = times[0];
        let mut h = times[1] - times[0];

        for &target in &times[1..] {
            let dir = (target - t).signum();
            let eps = 1e-14 * target.abs().max(1.0);
            while (target - t) * dir > eps {
                self.count_step(t, h)?;
                let remaining = target - t;
                let last = h.abs() >= remaining.abs();
                let used = if last { remaining } else { h.abs() * dir };
                let (fine, err) = self.doubled(integrator, t, &y, used)?;
                if err.is_nan() {
                    self.check(t + used, &fine)?;
                }
                if err <= 1.0 {
                    self.stats.accepted_steps += 1;
                    y = fine;
                    t = if last { target } else { t + used };
                    self.accept(t, &y)?;
                    if err < 1.0 / 128.0 && !last {
                        h = 2.0 * used;
                    } else if !last {
                        h = used;
                    }
                } else {
                    self.stats.rejected_steps += 1;
                    h = 0.5 * used;
                    if h.abs() < self.opts.min_step {
                        return Err(OrbitError::ToleranceNotMet {
                            t,
                            step: h,
                            state: self.last_good,
                        });
                    }
                }
            }
            states.push(self.last_good);
        }
        Ok(())
    }

    /// Fixed-step integration. The step is found once by halving the first
    /// output interval until a step and two half steps agree.
    fn fixed<I: Integrator>(
        &mut self,
        integrator: &I,
        init: PhaseState,
        times: &[f64],
        states: &mut Vec<PhaseState>,
    ) -> OrbitResult<()> {
        let mut y = init.to_cartesian();
        let mut h = (times[1] - times[0]).abs();
        loop {
            self.count_step(times[0], h)?;
            let trial = h * (times[1] - times[0]).signum();
            let (fine, err) = self.doubled(integrator, times[0], &y, trial)?;
            if err.is_nan() {
                self.check(times[0], &fine)?;
            }
            if err <= 1.0 {
                break;
            }
            self.stats.rejected_steps += 1;
            h *= 0.5;
            if h < self.opts.min_step {
                return Err(OrbitError::ToleranceNotMet {
                    t: times[0],
                    step: h,
                    state: self.last_good,
                });
            }
        }

        for w in times.windows(2) {
            let dt = w[1] - w[0];
            let n = (dt.abs() / h).ceil().max(1.0) as usize;
            let sub = dt / n as f64;
            for k in 0..n {
                let t = w[0] + k as f64 * sub;
                self.count_step(t, sub)?;
                y = integrator.step(self.model, t, &y, sub)?;
                self.stats.accepted_steps += 1;
                self.stats.force_evaluations += I::EVALUATIONS;
                let end = if k + 1 == n { w[1] } else { t + sub };
                self.accept(end, &y)?;
            }
            states.push(self.last_good);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evo_potential::LogarithmicHalo;

    fn halo() -> Vec<Potential> {
        vec![LogarithmicHalo::default().into()]
    }

    #[test]
    fn options_defaults() {
        let opts = IntegrationOptions::default();
        assert_eq!(opts.method, IntegrationMethod::Rk6);
        assert_eq!(opts.rtol, 1.49012e-10);
        assert_eq!(opts.atol, 0.0);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn invalid_options_rejected() {
        let opts = IntegrationOptions {
            rtol: 0.0,
            atol: 0.0,
            ..IntegrationOptions::default()
        };
        assert!(matches!(opts.validate(), Err(OrbitError::InvalidArg { .. })));
    }

    #[test]
    fn non_monotonic_times_rejected() {
        let init = PhaseState::new(1.0, 0.0, 1.0, 0.0);
        let opts = IntegrationOptions::default();
        for times in [vec![], vec![0.0, 1.0, 0.5], vec![0.0, 0.0], vec![0.0, f64::NAN]] {
            let err = integrate(&halo(), init, &times, &opts).unwrap_err();
            assert!(matches!(err, OrbitError::InvalidArg { .. }), "{times:?}");
        }
    }

    #[test]
    fn circular_orbit_stays_circular() {
        let init = PhaseState::new(1.0, 0.0, 1.0, 0.0);
        for (method, tol) in [(IntegrationMethod::Rk6, 1e-8), (IntegrationMethod::Leapfrog, 1e-5)] {
            let opts = IntegrationOptions {
                method,
                ..IntegrationOptions::default()
            };
            let traj = integrate(&halo(), init, &[0.0, 1.0, 2.0 * std::f64::consts::PI], &opts)
                .unwrap();
            let end = traj.last().unwrap();
            assert!((end.r - 1.0).abs() < tol, "{method:?}");
            assert!((end.vt - 1.0).abs() < tol, "{method:?}");
            // unwrapped azimuth after one full turn
            assert!((end.phi - 2.0 * std::f64::consts::PI).abs() < 100.0 * tol, "{method:?}");
        }
    }

    #[test]
    fn sparse_outputs_keep_azimuth_continuous() {
        let init = PhaseState::new(1.0, 0.0, 1.0, 0.0);
        let turns = 3.0 * std::f64::consts::TAU;
        let dense: Vec<f64> = evo_core::linspace(0.0, turns, 60);
        for method in [IntegrationMethod::Rk6, IntegrationMethod::Leapfrog] {
            let opts = IntegrationOptions {
                method,
                ..IntegrationOptions::default()
            };
            let sparse = integrate(&halo(), init, &[0.0, turns], &opts).unwrap();
            let dense = integrate(&halo(), init, &dense, &opts).unwrap();
            let (a, b) = (sparse.last().unwrap().phi, dense.last().unwrap().phi);
            assert!((a - turns).abs() < 1e-3, "{method:?}: sparse phi = {a}");
            assert!((a - b).abs() < 1e-3, "{method:?}: {a} vs {b}");
        }
    }

    #[test]
    fn backward_azimuth_unwinds_below_zero() {
        let init = PhaseState::new(1.0, 0.0, 1.0, 0.5);
        let turns = 2.0 * std::f64::consts::TAU;
        let traj = integrate(&halo(), init, &[0.0, -turns], &IntegrationOptions::default())
            .unwrap();
        assert!((traj.last().unwrap().phi - (0.5 - turns)).abs() < 1e-6);
    }

    #[test]
    fn trajectory_matrix_layout() {
        let init = PhaseState::new(0.9, 0.1, 1.1, 0.2);
        let traj = integrate(&halo(), init, &[0.0, -0.5], &IntegrationOptions::default()).unwrap();
        let m = traj.to_matrix();
        assert_eq!(m.shape(), (2, 4));
        assert_eq!(m[(0, 0)], 0.9);
        assert_eq!(m[(0, 3)], 0.2);
        assert!(traj.stats.accepted_steps > 0);
    }
}

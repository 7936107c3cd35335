//! Integration tests: conserved quantities and error reporting for orbits
//! in halo, bar and spiral potentials.

use evo_core::PhaseState;
use evo_orbit::{
    IntegrationMethod, IntegrationOptions, OrbitError, OrbitModel, OrbitResult, integrate,
    integrate_model,
};
use evo_potential::{
    ALWAYS_ON, DehnenBar, LogarithmicHalo, PlanarForce, Potential, PotentialError, SteadyLogSpiral,
};
use std::sync::Arc;

fn halo() -> LogarithmicHalo {
    LogarithmicHalo::default()
}

fn energy(s: &PhaseState) -> f64 {
    0.5 * (s.vr * s.vr + s.vt * s.vt) + halo().potential(s.r)
}

fn eccentric() -> PhaseState {
    PhaseState::new(0.9, 0.2, 0.8, 0.2)
}

fn times(t0: f64, t1: f64, n: usize) -> Vec<f64> {
    evo_core::linspace(t0, t1, n)
}

#[test]
fn rk6_conserves_energy_and_angular_momentum() {
    let pots = vec![Potential::from(halo())];
    let traj = integrate(&pots, eccentric(), &times(0.0, -10.0, 21), &IntegrationOptions::default())
        .unwrap();
    let (e0, l0) = (energy(&traj.states[0]), traj.states[0].angular_momentum());
    for s in &traj.states {
        assert!((energy(s) - e0).abs() < 1e-7);
        assert!((s.angular_momentum() - l0).abs() < 1e-7);
    }
}

#[test]
fn leapfrog_energy_error_stays_bounded() {
    let pots = vec![Potential::from(halo())];
    let opts = IntegrationOptions {
        method: IntegrationMethod::Leapfrog,
        ..IntegrationOptions::default()
    };
    let traj = integrate(&pots, eccentric(), &times(0.0, -10.0, 21), &opts).unwrap();
    let e0 = energy(&traj.states[0]);
    for s in &traj.states {
        assert!((energy(s) - e0).abs() < 1e-5);
    }
    assert!(traj.stats.accepted_steps >= 20);
}

#[test]
fn steady_bar_conserves_jacobi_integral() {
    let bar = DehnenBar {
        tform: ALWAYS_ON,
        tsteady: ALWAYS_ON,
        ..DehnenBar::default()
    };
    let pots = vec![Potential::from(halo()), Potential::from(bar)];
    let jacobi = |t: f64, s: &PhaseState| {
        energy(s) + bar.potential(s.r, s.phi, t) - bar.omegab * s.angular_momentum()
    };
    let ts = times(0.0, 8.0, 17);
    let traj = integrate(&pots, eccentric(), &ts, &IntegrationOptions::default()).unwrap();
    let j0 = jacobi(ts[0], &traj.states[0]);
    for (t, s) in ts.iter().zip(&traj.states) {
        assert!((jacobi(*t, s) - j0).abs() < 1e-6, "t = {t}");
    }
}

#[test]
fn spiral_orbit_is_time_reversible() {
    let pots = vec![
        Potential::from(halo()),
        Potential::from(SteadyLogSpiral {
            a: -0.005,
            omegas: 0.2,
            ..SteadyLogSpiral::default()
        }),
    ];
    let opts = IntegrationOptions::default();
    let fwd = integrate(&pots, eccentric(), &[0.0, 5.0], &opts).unwrap();
    let end = *fwd.last().unwrap();
    let back = integrate(&pots, end, &[5.0, 0.0], &opts).unwrap();
    let start = back.last().unwrap();
    let init = eccentric();
    assert!((start.r - init.r).abs() < 1e-6);
    assert!((start.vr - init.vr).abs() < 1e-6);
    assert!((start.vt - init.vt).abs() < 1e-6);
    assert!((start.phi - init.phi).abs() < 1e-6);
}

/// Halo force that turns NaN before `t = -0.5`.
struct BrokenHalo;

impl OrbitModel for BrokenHalo {
    fn acceleration(&self, t: f64, pos: [f64; 2]) -> OrbitResult<[f64; 2]> {
        if t < -0.5 {
            return Ok([f64::NAN, f64::NAN]);
        }
        halo().acceleration(t, pos)
    }
}

#[test]
fn non_finite_force_reports_integration_failure() {
    let init = eccentric();
    let ts = [0.0, -0.25, -1.0];
    for method in [IntegrationMethod::Rk6, IntegrationMethod::Leapfrog] {
        let opts = IntegrationOptions {
            method,
            ..IntegrationOptions::default()
        };
        let err = integrate_model(&BrokenHalo, init, &ts, &opts).unwrap_err();
        let early = integrate_model(&BrokenHalo, init, &ts[..2], &opts).unwrap();
        match err {
            // the failing step's time and the last accepted substep,
            // not the output time or the output state
            OrbitError::IntegrationFailure { t, state } => {
                assert!((-1.0..-0.5).contains(&t), "{method:?}: t = {t}");
                assert!(state.is_finite());
                assert_ne!(state, *early.last().unwrap(), "{method:?}");
            }
            other => panic!("{method:?}: unexpected error {other:?}"),
        }
    }
}

#[test]
fn origin_is_an_invalid_start() {
    let pots = vec![Potential::from(halo())];
    let init = PhaseState::new(0.0, 0.0, 0.0, 0.0);
    let err = integrate(&pots, init, &[0.0, 1.0], &IntegrationOptions::default()).unwrap_err();
    assert!(matches!(err, OrbitError::InvalidArg { .. }));
}

#[test]
fn tiny_step_budget_reports_tolerance() {
    let pots = vec![Potential::from(halo())];
    let opts = IntegrationOptions {
        max_steps: 3,
        ..IntegrationOptions::default()
    };
    let err = integrate(&pots, eccentric(), &[0.0, -10.0], &opts).unwrap_err();
    assert!(matches!(err, OrbitError::ToleranceNotMet { .. }));
}

#[test]
fn custom_potential_is_a_configuration_error() {
    struct Kepler;
    impl PlanarForce for Kepler {
        fn forces(&self, r: f64, _phi: f64, _t: f64) -> (f64, f64) {
            (-1.0 / (r * r), 0.0)
        }
    }
    let pots = vec![Potential::Custom(Arc::new(Kepler))];
    let err = integrate(&pots, eccentric(), &[0.0, 1.0], &IntegrationOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        OrbitError::Configuration(PotentialError::Unsupported { .. })
    ));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn single_time_returns_initial_state(
            r in 0.2_f64..2.0,
            vr in -0.5_f64..0.5,
            vt in 0.3_f64..1.5,
            phi in -10.0_f64..10.0,
            t0 in -20.0_f64..20.0,
        ) {
            let pots = vec![Potential::from(halo()), Potential::from(DehnenBar::default())];
            let init = PhaseState::new(r, vr, vt, phi);
            let traj = integrate(&pots, init, &[t0], &IntegrationOptions::default()).unwrap();
            prop_assert_eq!(traj.states.len(), 1);
            prop_assert_eq!(traj.states[0], init);
            prop_assert_eq!(traj.stats.force_evaluations, 0);
        }

        #[test]
        fn first_row_is_initial_state(
            r in 0.5_f64..1.5,
            vt in 0.5_f64..1.2,
            dt in -2.0_f64..-0.1,
        ) {
            let pots = vec![Potential::from(halo())];
            let init = PhaseState::new(r, 0.05, vt, 0.2);
            let traj = integrate(&pots, init, &[0.0, dt], &IntegrationOptions::default()).unwrap();
            prop_assert_eq!(traj.states[0], init);
            prop_assert_eq!(traj.states.len(), 2);
        }
    }
}

//! Integration tests: identity at t0, degraded grids and configuration
//! errors.

use evo_core::PhaseState;
use evo_df::{DehnenDf, InitialDf};
use evo_moments::{
    EdfError, ErrorKind, EvalPoint, EvolvedDiskDf, GridOptions, KnownMoments, Sampling,
};
use evo_orbit::IntegrationOptions;
use evo_potential::{DehnenBar, EllipticalDisk, LogarithmicHalo, Potential};

fn small_grid() -> GridOptions {
    GridOptions {
        gridpoints: 5,
        ..GridOptions::default()
    }
}

/// Step budget too small to reach t0.
fn starved() -> IntegrationOptions {
    IntegrationOptions {
        max_steps: 2,
        ..IntegrationOptions::default()
    }
}

fn halo() -> Vec<Potential> {
    vec![LogarithmicHalo::default().into()]
}

#[test]
fn degraded_grid_warns_by_default() {
    let edf = EvolvedDiskDf::new(DehnenDf::default(), &halo(), -10.0, starved()).unwrap();
    let at = EvalPoint::new(0.9, 0.2, 0.0);
    let grid = edf.velocity_grid(&at, &small_grid()).unwrap();
    assert_eq!(grid.failed(), 25);
    assert!(grid.coarse().initial.iter().all(Option::is_none));
    let smass = edf
        .surface_mass(&at, Sampling::Grid(&grid), &KnownMoments::default())
        .unwrap();
    assert_eq!(smass, 0.0);
}

#[test]
fn means_of_an_empty_degraded_grid_are_errors_not_nan() {
    let edf = EvolvedDiskDf::new(DehnenDf::default(), &halo(), -10.0, starved()).unwrap();
    let at = EvalPoint::new(0.9, 0.2, 0.0);
    let grid = edf.velocity_grid(&at, &small_grid()).unwrap();
    let degraded = EdfError::DegradedGrid { failed: 25, total: 25 };
    let known = KnownMoments::default();
    assert_eq!(edf.mean_vr(&at, Sampling::Grid(&grid), &known), Err(degraded.clone()));
    assert_eq!(edf.sigma_t2(&at, Sampling::Grid(&grid), &known), Err(degraded.clone()));
    assert_eq!(edf.moment_set(&at, Sampling::Grid(&grid)), Err(degraded));
    // a caller-supplied mass is used as given
    let given = KnownMoments {
        surface_mass: Some(1.0),
        ..KnownMoments::default()
    };
    assert_eq!(edf.mean_vt(&at, Sampling::Grid(&grid), &given).unwrap(), 0.0);
}

#[test]
fn degraded_grid_errors_in_strict_mode() {
    let edf = EvolvedDiskDf::new(DehnenDf::default(), &halo(), -10.0, starved())
        .unwrap()
        .strict(true);
    let at = EvalPoint::new(0.9, 0.2, 0.0);
    let err = edf
        .mean_vr(&at, Sampling::Build(small_grid()), &KnownMoments::default())
        .unwrap_err();
    assert_eq!(err, EdfError::DegradedGrid { failed: 25, total: 25 });
    assert_eq!(err.kind(), ErrorKind::Integration);
}

#[test]
fn single_orbit_failure_is_an_orbit_error() {
    let edf = EvolvedDiskDf::new(DehnenDf::default(), &halo(), -10.0, starved()).unwrap();
    let err = edf
        .eval(PhaseState::new(0.9, 0.0, 1.0, 0.2), 0.0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Tolerance);
}

#[test]
fn invalid_grid_options_are_configuration_errors() {
    let edf =
        EvolvedDiskDf::new(DehnenDf::default(), &halo(), -10.0, IntegrationOptions::default())
            .unwrap();
    let bad = GridOptions {
        gridpoints: 1,
        ..GridOptions::default()
    };
    let err = edf
        .velocity_grid(&EvalPoint::new(0.9, 0.2, 0.0), &bad)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn evolved_df_at_t0_is_initial_df(
            r in 0.3_f64..2.0,
            vr in -0.6_f64..0.6,
            vt in 0.2_f64..1.6,
            phi in -3.0_f64..3.0,
            t0 in -20.0_f64..0.0,
            with_bar in any::<bool>(),
        ) {
            let mut pots = halo();
            if with_bar {
                pots.push(DehnenBar::default().into());
            } else {
                pots.push(EllipticalDisk::default().into());
            }
            let idf = DehnenDf::default();
            let edf = EvolvedDiskDf::new(idf, &pots, t0, IntegrationOptions::default()).unwrap();
            let s = PhaseState::new(r, vr, vt, phi);
            prop_assert_eq!(edf.eval(s, t0).unwrap(), idf.eval_state(&s));
        }
    }
}

//! Integration tests: direct quadrature computes each lower moment once.

use std::sync::atomic::{AtomicUsize, Ordering};

use evo_core::EvoResult;
use evo_df::{DehnenDf, InitialDf, VelocityScales};
use evo_moments::{DirectOptions, EvalPoint, EvolvedDiskDf, KnownMoments, Sampling};
use evo_orbit::IntegrationOptions;
use evo_potential::LogarithmicHalo;

/// Dehnen DF that counts its evaluations.
struct Counting {
    inner: DehnenDf,
    calls: AtomicUsize,
}

impl Counting {
    fn take(&self) -> usize {
        self.calls.swap(0, Ordering::Relaxed)
    }
}

impl InitialDf for Counting {
    fn eval(&self, r: f64, vr: f64, vt: f64) -> f64 {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.eval(r, vr, vt)
    }

    fn target_sigma_r2(&self, r: f64) -> f64 {
        self.inner.target_sigma_r2(r)
    }

    fn circular_velocity(&self, r: f64) -> f64 {
        self.inner.circular_velocity(r)
    }

    fn velocity_scales(&self, r: f64) -> EvoResult<VelocityScales> {
        self.inner.velocity_scales(r)
    }
}

fn counting_edf() -> EvolvedDiskDf<Counting> {
    let idf = Counting {
        inner: DehnenDf::default(),
        calls: AtomicUsize::new(0),
    };
    EvolvedDiskDf::new(
        idf,
        &[LogarithmicHalo::default().into()],
        0.0,
        IntegrationOptions::default(),
    )
    .unwrap()
}

fn direct() -> Sampling<'static> {
    Sampling::Direct(DirectOptions {
        epsrel: 1e-5,
        ..DirectOptions::default()
    })
}

#[test]
fn lower_moments_are_integrated_once_per_call() {
    let edf = counting_edf();
    let at = EvalPoint::new(0.9, 0.0, 0.0);
    let known = KnownMoments::default();

    let set = edf.moment_set(&at, direct()).unwrap();
    let for_set = edf.initial_df().take();
    let vd = edf.vertex_deviation(&at, direct(), &known).unwrap();
    let for_vd = edf.initial_df().take();
    let srt = edf.sigma_rt(&at, direct(), &known).unwrap();
    let for_srt = edf.initial_df().take();

    // the same six raw moments
    assert_eq!(for_vd, for_set);
    // mass, both means and the cross moment
    assert!(for_srt > 0 && for_srt < for_set, "{for_srt} vs {for_set}");
    assert_eq!(vd, set.vertex_deviation);
    assert_eq!(srt, set.sigma_rt);
}

#[test]
fn supplied_means_skip_their_integrals() {
    let edf = counting_edf();
    let at = EvalPoint::new(0.9, 0.0, 0.0);
    let set = edf.moment_set(&at, direct()).unwrap();
    edf.initial_df().take();

    let srt = edf.sigma_rt(&at, direct(), &KnownMoments::default()).unwrap();
    let computed = edf.initial_df().take();
    let known = KnownMoments {
        surface_mass: Some(set.surface_mass),
        mean_vr: Some(set.mean_vr),
        mean_vt: Some(set.mean_vt),
        ..KnownMoments::default()
    };
    let supplied = edf.sigma_rt(&at, direct(), &known).unwrap();
    assert!(edf.initial_df().take() < computed);
    assert_eq!(supplied, srt);
}

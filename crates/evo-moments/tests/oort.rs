//! Integration tests: Oort constants of a disk evolved in a very mildly
//! elliptical potential equal those of the initial DF.

use evo_df::{DehnenDf, StaticQuadrature, static_oort_a, static_oort_b};
use evo_moments::{EdfError, EvalPoint, EvolvedDiskDf, OortOptions};
use evo_orbit::IntegrationOptions;
use evo_potential::{EllipticalDisk, LogarithmicHalo, Potential};

#[test]
fn oort_constants_match_initial_df() {
    let pots = vec![
        Potential::from(LogarithmicHalo::default()),
        Potential::from(EllipticalDisk {
            twophio: 0.001,
            ..EllipticalDisk::default()
        }),
    ];
    let edf =
        EvolvedDiskDf::new(DehnenDf::default(), &pots, -10.0, IntegrationOptions::default())
            .unwrap();
    let at = EvalPoint::new(0.9, 0.2, 0.0);
    let grids = edf.oort_grids(&at, &OortOptions::default()).unwrap();
    let oort = edf.oort_constants(&at, &grids).unwrap();

    let q = StaticQuadrature::default();
    let ia = static_oort_a(edf.initial_df(), 0.9, 1e-3, &q).unwrap();
    let ib = static_oort_b(edf.initial_df(), 0.9, 1e-3, &q).unwrap();
    assert!((oort.a - ia).abs() < 5e-3, "A = {} vs {ia}", oort.a);
    assert!((oort.b - ib).abs() < 5e-3, "B = {} vs {ib}", oort.b);
    assert!(oort.c.abs() < 5e-3, "C = {}", oort.c);
    assert!(oort.k.abs() < 5e-3, "K = {}", oort.k);

    // reused grids give the same numbers
    assert_eq!(edf.oort_a(&at, &grids).unwrap(), oort.a);
    assert_eq!(edf.oort_b(&at, &grids).unwrap(), oort.b);
    assert_eq!(edf.oort_c(&at, &grids).unwrap(), oort.c);
    assert_eq!(edf.oort_k(&at, &grids).unwrap(), oort.k);

    // but not at another point
    let err = edf
        .oort_a(&EvalPoint::new(0.9, 0.3, 0.0), &grids)
        .unwrap_err();
    assert!(matches!(err, EdfError::GridMismatch { .. }));
}

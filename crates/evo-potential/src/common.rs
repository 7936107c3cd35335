//! Helpers shared by the time-dependent perturbations.

use crate::error::{PotentialError, PotentialResult};

/// Start/end of the growth phase. `ALWAYS_ON` switches the perturbation on
/// for all times.
pub const ALWAYS_ON: f64 = f64::NEG_INFINITY;

/// Smooth growth factor: 0 before `tform`, 1 after `tsteady`, and the quintic
/// step `3/16 xi^5 - 5/8 xi^3 + 15/16 xi + 1/2` in between, with
/// `xi = 2 (t - tform) / (tsteady - tform) - 1`.
#[inline]
pub fn growth_factor(t: f64, tform: f64, tsteady: f64) -> f64 {
    if t < tform {
        0.0
    } else if t < tsteady {
        let xi = 2.0 * (t - tform) / (tsteady - tform) - 1.0;
        let xi2 = xi * xi;
        xi * (3.0 / 16.0 * xi2 * xi2 - 5.0 / 8.0 * xi2 + 15.0 / 16.0) + 0.5
    } else {
        1.0
    }
}

/// Map an optional growth window onto the `(tform, tsteady)` pair stored in
/// parameter blocks. A missing `tsteady` defaults to `tform + default_span`.
/// A `tsteady` without `tform`, or one not after `tform`, is rejected.
pub fn growth_window(
    tform: Option<f64>,
    tsteady: Option<f64>,
    default_span: f64,
) -> PotentialResult<(f64, f64)> {
    match (tform, tsteady) {
        (None, None) => Ok((ALWAYS_ON, ALWAYS_ON)),
        (None, Some(_)) => Err(PotentialError::InvalidArg {
            what: "tsteady given without tform",
        }),
        (Some(tf), ts) => {
            let ts = ts.unwrap_or(tf + default_span);
            if !tf.is_finite() || ts.is_nan() || ts <= tf {
                return Err(PotentialError::InvalidArg {
                    what: "growth window needs a finite tform before tsteady",
                });
            }
            Ok((tf, ts))
        }
    }
}

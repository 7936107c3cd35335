//! Velocity moments of an unevolved DF by direct Simpson quadrature.
//!
//! These are the moments the DF has in its own equilibrium potential. They
//! size the velocity windows of evolved grids and serve as reference values.

use evo_core::{EvoError, EvoResult, ensure_finite, linspace, simpson_weights};
use rayon::prelude::*;

use crate::traits::{InitialDf, VelocityScales};

/// Lattice used by [`static_moments`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticQuadrature {
    /// Nodes per velocity axis
    pub points: usize,
    /// Half-width of the window in units of the target radial dispersion
    pub nsigma: f64,
}

impl Default for StaticQuadrature {
    fn default() -> Self {
        Self {
            points: 201,
            nsigma: 6.0,
        }
    }
}

/// Surface mass and first/second velocity moments at one radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticMoments {
    pub surface_mass: f64,
    pub mean_vr: f64,
    pub mean_vt: f64,
    pub sigma_r2: f64,
    pub sigma_t2: f64,
    pub sigma_rt: f64,
}

impl StaticMoments {
    pub fn scales(&self) -> VelocityScales {
        VelocityScales {
            mean_vr: self.mean_vr,
            mean_vt: self.mean_vt,
            sigma_r: self.sigma_r2.max(0.0).sqrt(),
            sigma_t: self.sigma_t2.max(0.0).sqrt(),
        }
    }
}

/// Moments of `df` at radius `r` over `vR in +- nsigma sigma_R`,
/// `vT in vc +- nsigma sigma_R`.
pub fn static_moments<D: InitialDf + ?Sized>(
    df: &D,
    r: f64,
    q: &StaticQuadrature,
) -> EvoResult<StaticMoments> {
    if !(r.is_finite() && r > 0.0) {
        return Err(EvoError::InvalidArg {
            what: "radius must be positive",
        });
    }
    if q.points < 3 || q.nsigma.is_nan() || q.nsigma <= 0.0 {
        return Err(EvoError::InvalidArg {
            what: "static quadrature needs >= 3 points and nsigma > 0",
        });
    }
    let sigma = ensure_finite(df.target_sigma_r2(r), "target sigma_R^2")?.sqrt();
    let vc = ensure_finite(df.circular_velocity(r), "circular velocity")?;
    let half = q.nsigma * sigma;

    let vrs = linspace(-half, half, q.points);
    let vts = linspace(vc - half, vc + half, q.points);
    let h = 2.0 * half / (q.points - 1) as f64;
    let w = simpson_weights(q.points, h);

    // [M00, M10, M01, M20, M02, M11]
    let m = (0..q.points)
        .into_par_iter()
        .map(|i| {
            let vr = vrs[i];
            let mut row = [0.0; 6];
            for (j, &vt) in vts.iter().enumerate() {
                let f = w[i] * w[j] * df.eval(r, vr, vt);
                row[0] += f;
                row[1] += f * vr;
                row[2] += f * vt;
                row[3] += f * vr * vr;
                row[4] += f * vt * vt;
                row[5] += f * vr * vt;
            }
            row
        })
        .reduce(
            || [0.0; 6],
            |mut a, b| {
                for k in 0..6 {
                    a[k] += b[k];
                }
                a
            },
        );

    let m00 = ensure_finite(m[0], "static surface mass")?;
    if m00 <= 0.0 {
        return Err(EvoError::NonFinite {
            what: "static surface mass is not positive",
            value: m00,
        });
    }
    let mean_vr = m[1] / m00;
    let mean_vt = m[2] / m00;
    Ok(StaticMoments {
        surface_mass: m00,
        mean_vr,
        mean_vt,
        sigma_r2: m[3] / m00 - mean_vr * mean_vr,
        sigma_t2: m[4] / m00 - mean_vt * mean_vt,
        sigma_rt: m[5] / m00 - mean_vr * mean_vt,
    })
}

fn mean_vt_slope<D: InitialDf + ?Sized>(
    df: &D,
    r: f64,
    delta: f64,
    q: &StaticQuadrature,
) -> EvoResult<(f64, f64)> {
    let vt = static_moments(df, r, q)?.mean_vt;
    let plus = static_moments(df, r + delta, q)?.mean_vt;
    let minus = static_moments(df, r - delta, q)?.mean_vt;
    Ok((vt, (plus - minus) / (2.0 * delta)))
}

/// Oort A of the unevolved, axisymmetric DF: `1/2 (vT/R - dvT/dR)`.
pub fn static_oort_a<D: InitialDf + ?Sized>(
    df: &D,
    r: f64,
    delta: f64,
    q: &StaticQuadrature,
) -> EvoResult<f64> {
    let (vt, dvt) = mean_vt_slope(df, r, delta, q)?;
    Ok(0.5 * (vt / r - dvt))
}

/// Oort B of the unevolved, axisymmetric DF: `1/2 (-vT/R - dvT/dR)`.
pub fn static_oort_b<D: InitialDf + ?Sized>(
    df: &D,
    r: f64,
    delta: f64,
    q: &StaticQuadrature,
) -> EvoResult<f64> {
    let (vt, dvt) = mean_vt_slope(df, r, delta, q)?;
    Ok(0.5 * (-vt / r - dvt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DehnenDf, ExpProfile};

    #[test]
    fn dehnen_moments_are_sensible() {
        let df = DehnenDf::default();
        let r = 0.9;
        let m = static_moments(&df, r, &StaticQuadrature::default()).unwrap();
        assert!(m.mean_vr.abs() < 1e-12);
        // asymmetric drift
        assert!(m.mean_vt < 1.0 && m.mean_vt > 0.8);
        let target = df.target_sigma_r2(r);
        assert!((m.sigma_r2 / target - 1.0).abs() < 0.2);
        // epicyclic ratio for a flat rotation curve
        assert!((m.sigma_t2 / m.sigma_r2 - 0.5).abs() < 0.15);
        assert!(m.sigma_rt.abs() < 1e-12);
    }

    #[test]
    fn cold_disk_oort_constants_of_flat_curve() {
        let df = DehnenDf::new(
            0.0,
            ExpProfile {
                sigma0: 0.05,
                ..ExpProfile::default()
            },
        );
        let q = StaticQuadrature::default();
        let a = static_oort_a(&df, 1.0, 1e-3, &q).unwrap();
        let b = static_oort_b(&df, 1.0, 1e-3, &q).unwrap();
        assert!((a - 0.5).abs() < 0.02, "A = {a}");
        assert!((b + 0.5).abs() < 0.02, "B = {b}");
    }

    #[test]
    fn velocity_scales_follow_moments() {
        let df = DehnenDf::default();
        let s = df.velocity_scales(0.9).unwrap();
        let m = static_moments(&df, 0.9, &StaticQuadrature::default()).unwrap();
        assert_eq!(s.mean_vt, m.mean_vt);
        assert!((s.sigma_r * s.sigma_r - m.sigma_r2).abs() < 1e-15);
    }

    #[test]
    fn invalid_radius_rejected() {
        let df = DehnenDf::default();
        let q = StaticQuadrature::default();
        assert!(matches!(
            static_moments(&df, -1.0, &q),
            Err(EvoError::InvalidArg { .. })
        ));
    }
}

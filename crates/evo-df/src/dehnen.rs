//! Dehnen (1999) distribution function for a power-law rotation curve.

use std::f64::consts::PI;

use crate::profile::ExpProfile;
use crate::traits::InitialDf;

/// `f(E, L) = gamma Sigma(xE) / (2 pi sigma^2(xE)) exp(Omega(xE) (L - L(xE)) / sigma^2(xE))`
/// for the rotation curve `vc = R^beta`, where `xE` is the radius of the
/// circular orbit with energy `E`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DehnenDf {
    pub beta: f64,
    pub profile: ExpProfile,
}

impl Default for DehnenDf {
    fn default() -> Self {
        Self {
            beta: 0.0,
            profile: ExpProfile::default(),
        }
    }
}

impl DehnenDf {
    pub fn new(beta: f64, profile: ExpProfile) -> Self {
        Self { beta, profile }
    }

    fn gamma(&self) -> f64 {
        (2.0 / (1.0 + self.beta)).sqrt()
    }

    /// Potential of the power-law rotation curve.
    pub fn potential(&self, r: f64) -> f64 {
        if self.beta == 0.0 {
            r.ln()
        } else {
            r.powf(2.0 * self.beta) / (2.0 * self.beta)
        }
    }

    /// `(xE, Omega(xE) (L - L(xE)))`, or `None` when no circular orbit has
    /// energy `e`.
    fn guiding(&self, e: f64, l: f64) -> Option<(f64, f64)> {
        let b = self.beta;
        if b == 0.0 {
            let xe = (e - 0.5).exp();
            Some((xe, l / xe - 1.0))
        } else {
            let arg = 2.0 * b * e / (1.0 + b);
            if arg <= 0.0 || !arg.is_finite() {
                return None;
            }
            let xe = arg.powf(1.0 / (2.0 * b));
            Some((xe, xe.powf(b - 1.0) * l - xe.powf(2.0 * b)))
        }
    }

    pub fn eval_el(&self, e: f64, l: f64) -> f64 {
        let Some((xe, olle)) = self.guiding(e, l) else {
            return 0.0;
        };
        if !(xe > 0.0 && xe.is_finite()) {
            return 0.0;
        }
        let ln_s2 = self.profile.ln_sigma2(xe);
        let ln_f = self.profile.ln_surface_mass(xe) - ln_s2 + olle / ln_s2.exp();
        self.gamma() * ln_f.exp() / (2.0 * PI)
    }
}

impl InitialDf for DehnenDf {
    fn eval(&self, r: f64, vr: f64, vt: f64) -> f64 {
        let e = 0.5 * (vr * vr + vt * vt) + self.potential(r);
        self.eval_el(e, r * vt)
    }

    fn target_sigma_r2(&self, r: f64) -> f64 {
        self.profile.sigma2(r)
    }

    fn circular_velocity(&self, r: f64) -> f64 {
        r.powf(self.beta)
    }
}

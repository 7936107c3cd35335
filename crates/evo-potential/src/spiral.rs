//! Steady logarithmic spiral perturbation.

use crate::common::{ALWAYS_ON, growth_factor, growth_window};
use crate::error::PotentialResult;
use crate::traits::PlanarForce;

/// `Phi = amp s(t) A / alpha cos(alpha ln R - m (phi - omegas t) - gamma)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SteadyLogSpiral {
    pub amp: f64,
    pub tform: f64,
    pub tsteady: f64,
    /// Spiral strength `A`
    pub a: f64,
    pub alpha: f64,
    pub m: f64,
    pub omegas: f64,
    pub gamma: f64,
}

impl Default for SteadyLogSpiral {
    fn default() -> Self {
        Self {
            amp: 1.0,
            tform: ALWAYS_ON,
            tsteady: ALWAYS_ON,
            a: -0.035,
            alpha: -7.0,
            m: 2.0,
            omegas: 0.65,
            gamma: std::f64::consts::FRAC_PI_4,
        }
    }
}

impl SteadyLogSpiral {
    pub const N_ARGS: usize = 8;

    /// Set `alpha` from a pitch angle (radians) for the current `m`.
    pub fn with_pitch_angle(mut self, p: f64) -> Self {
        self.alpha = self.m / p.tan();
        self
    }

    /// Grow the spiral from `tform`; `tsteady` defaults to `tform + 2`.
    pub fn growing(mut self, tform: f64, tsteady: Option<f64>) -> PotentialResult<Self> {
        (self.tform, self.tsteady) = growth_window(Some(tform), tsteady, 2.0)?;
        Ok(self)
    }

    pub fn args(&self) -> [f64; Self::N_ARGS] {
        [
            self.amp,
            self.tform,
            self.tsteady,
            self.a,
            self.alpha,
            self.m,
            self.omegas,
            self.gamma,
        ]
    }

    pub fn from_args(a: &[f64]) -> Self {
        Self {
            amp: a[0],
            tform: a[1],
            tsteady: a[2],
            a: a[3],
            alpha: a[4],
            m: a[5],
            omegas: a[6],
            gamma: a[7],
        }
    }

    pub fn potential(&self, r: f64, phi: f64, t: f64) -> f64 {
        let s = growth_factor(t, self.tform, self.tsteady);
        self.amp * s * self.a / self.alpha * self.phase(r, phi, t).cos()
    }

    #[inline]
    fn phase(&self, r: f64, phi: f64, t: f64) -> f64 {
        self.alpha * r.ln() - self.m * (phi - self.omegas * t) - self.gamma
    }
}

impl PlanarForce for SteadyLogSpiral {
    #[inline]
    fn forces(&self, r: f64, phi: f64, t: f64) -> (f64, f64) {
        let s = growth_factor(t, self.tform, self.tsteady);
        if s == 0.0 {
            return (0.0, 0.0);
        }
        let k = self.amp * s * self.a * self.phase(r, phi, t).sin();
        (k / r, -k * self.m / self.alpha)
    }
}

//! Dehnen (2000) quadrupole bar that grows smoothly to full strength.

use std::f64::consts::{FRAC_1_SQRT_2, PI, TAU};

use crate::common::growth_factor;
use crate::traits::PlanarForce;

/// Rotating `m = 2` bar. Inside `rb` the potential is
/// `amp af s(t) cos(2 (phi - omegab t - barphi)) ((R/rb)^3 - 2)`, outside
/// it is `-amp af s(t) cos(...) (rb/R)^3`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DehnenBar {
    pub amp: f64,
    pub tform: f64,
    pub tsteady: f64,
    pub rb: f64,
    pub af: f64,
    pub omegab: f64,
    pub barphi: f64,
}

impl Default for DehnenBar {
    /// Outer Lindblad resonance at 0.9, strength 0.01, angle 25 degrees,
    /// forming from four bar periods before `t = 0` over two periods.
    fn default() -> Self {
        Self::from_resonance(0.9, 0.01, 25f64.to_radians(), -4.0, 2.0)
    }
}

impl DehnenBar {
    pub const N_ARGS: usize = 7;

    /// Bar with the outer Lindblad resonance at `rolr` for a flat rotation
    /// curve and strength `alpha` (bar-to-axisymmetric radial force ratio at
    /// `R = 1`). `tform_periods` and `growth_periods` are measured in bar
    /// periods.
    pub fn from_resonance(
        rolr: f64,
        alpha: f64,
        barphi: f64,
        tform_periods: f64,
        growth_periods: f64,
    ) -> Self {
        let corot = 1.0 / (1.0 + FRAC_1_SQRT_2);
        let omegab = 1.0 / (rolr * corot);
        let rb = 0.8 * rolr * corot;
        let period = TAU / omegab;
        let tform = tform_periods * period;
        Self {
            amp: 1.0,
            tform,
            tsteady: tform + growth_periods * period,
            rb,
            af: alpha / 3.0 / rb.powi(3),
            omegab,
            barphi,
        }
    }

    pub fn period(&self) -> f64 {
        2.0 * PI / self.omegab
    }

    pub fn args(&self) -> [f64; Self::N_ARGS] {
        [
            self.amp,
            self.tform,
            self.tsteady,
            self.rb,
            self.af,
            self.omegab,
            self.barphi,
        ]
    }

    pub fn from_args(a: &[f64]) -> Self {
        Self {
            amp: a[0],
            tform: a[1],
            tsteady: a[2],
            rb: a[3],
            af: a[4],
            omegab: a[5],
            barphi: a[6],
        }
    }

    pub fn potential(&self, r: f64, phi: f64, t: f64) -> f64 {
        let s = growth_factor(t, self.tform, self.tsteady);
        let c = (2.0 * (phi - self.omegab * t - self.barphi)).cos();
        let shape = if r <= self.rb {
            (r / self.rb).powi(3) - 2.0
        } else {
            -(self.rb / r).powi(3)
        };
        self.amp * self.af * s * c * shape
    }
}

impl PlanarForce for DehnenBar {
    #[inline]
    fn forces(&self, r: f64, phi: f64, t: f64) -> (f64, f64) {
        let s = growth_factor(t, self.tform, self.tsteady);
        if s == 0.0 {
            return (0.0, 0.0);
        }
        let k = self.amp * self.af * s;
        let (sin2, cos2) = (2.0 * (phi - self.omegab * t - self.barphi)).sin_cos();
        if r <= self.rb {
            let x = (r / self.rb).powi(3);
            // (R/rb)^3 / R written without the division, regular at R = 0
            (
                -3.0 * k * cos2 * r * r / self.rb.powi(3),
                2.0 * k * sin2 * (x - 2.0),
            )
        } else {
            let x = (self.rb / r).powi(3);
            (-3.0 * k * cos2 * x / r, -2.0 * k * sin2 * x)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bar_parameters() {
        let bar = DehnenBar::default();
        let omegab = (1.0 + 2f64.sqrt() / 2.0) / 0.9;
        assert!((bar.omegab - omegab).abs() < 1e-14);
        assert!((bar.rb - 0.8 * 0.9 / (1.0 + 2f64.sqrt() / 2.0)).abs() < 1e-14);
        assert!((bar.tform + 4.0 * bar.period()).abs() < 1e-12);
        assert!((bar.tsteady - bar.tform - 2.0 * bar.period()).abs() < 1e-12);
    }

    #[test]
    fn bar_is_off_before_formation() {
        let bar = DehnenBar::default();
        assert_eq!(bar.forces(0.9, 0.2, bar.tform - 1.0), (0.0, 0.0));
    }

    #[test]
    fn forces_match_potential_gradient() {
        let bar = DehnenBar {
            tform: f64::NEG_INFINITY,
            tsteady: f64::NEG_INFINITY,
            ..DehnenBar::default()
        };
        let h = 1e-6;
        for &(r, phi, t) in &[(0.3, 0.4, 1.0), (0.9, -1.2, 3.0), (2.0, 2.5, -7.0)] {
            let (fr, fphi) = bar.forces(r, phi, t);
            let dr = -(bar.potential(r + h, phi, t) - bar.potential(r - h, phi, t)) / (2.0 * h);
            let dphi = -(bar.potential(r, phi + h, t) - bar.potential(r, phi - h, t)) / (2.0 * h);
            assert!((fr - dr).abs() < 1e-8, "R={r}: {fr} vs {dr}");
            assert!((fphi - dphi).abs() < 1e-8, "R={r}: {fphi} vs {dphi}");
        }
    }

    #[test]
    fn bar_force_is_regular_at_origin() {
        let bar = DehnenBar::default();
        let (fr, fphi) = bar.forces(0.0, 0.0, 0.0);
        assert!(fr.is_finite() && fphi.is_finite());
    }
}

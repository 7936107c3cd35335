//! Elliptical disk: `Phi = amp s(t) twophio/2 R^p cos(2 (phi - phib))`.

use crate::common::{ALWAYS_ON, growth_factor, growth_window};
use crate::error::PotentialResult;
use crate::traits::PlanarForce;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EllipticalDisk {
    pub amp: f64,
    pub tform: f64,
    pub tsteady: f64,
    /// Potential perturbation at `R = 1`, pre-scaled by `r1^-p`.
    pub twophio: f64,
    pub p: f64,
    pub phib: f64,
}

impl Default for EllipticalDisk {
    fn default() -> Self {
        Self::new(0.01, 1.0, 25f64.to_radians(), 1.0)
    }
}

impl EllipticalDisk {
    pub const N_ARGS: usize = 6;

    /// Perturbation with amplitude `twophio` at radius `r1`.
    pub fn new(twophio: f64, p: f64, phib: f64, r1: f64) -> Self {
        Self {
            amp: 1.0,
            tform: ALWAYS_ON,
            tsteady: ALWAYS_ON,
            twophio: twophio * r1.powf(-p),
            p,
            phib,
        }
    }

    /// Grow from `tform`; `tsteady` defaults to `tform + 2`.
    pub fn growing(mut self, tform: f64, tsteady: Option<f64>) -> PotentialResult<Self> {
        (self.tform, self.tsteady) = growth_window(Some(tform), tsteady, 2.0)?;
        Ok(self)
    }

    pub fn args(&self) -> [f64; Self::N_ARGS] {
        [
            self.amp,
            self.tform,
            self.tsteady,
            self.twophio,
            self.p,
            self.phib,
        ]
    }

    pub fn from_args(a: &[f64]) -> Self {
        Self {
            amp: a[0],
            tform: a[1],
            tsteady: a[2],
            twophio: a[3],
            p: a[4],
            phib: a[5],
        }
    }

    pub fn potential(&self, r: f64, phi: f64, t: f64) -> f64 {
        let s = growth_factor(t, self.tform, self.tsteady);
        0.5 * self.amp * s * self.twophio * r.powf(self.p) * (2.0 * (phi - self.phib)).cos()
    }
}

impl PlanarForce for EllipticalDisk {
    #[inline]
    fn forces(&self, r: f64, phi: f64, t: f64) -> (f64, f64) {
        let s = growth_factor(t, self.tform, self.tsteady);
        if s == 0.0 {
            return (0.0, 0.0);
        }
        let k = self.amp * s * self.twophio;
        let (sin2, cos2) = (2.0 * (phi - self.phib)).sin_cos();
        (
            -0.5 * k * self.p * r.powf(self.p - 1.0) * cos2,
            k * r.powf(self.p) * sin2,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forces_match_potential_gradient() {
        let disk = EllipticalDisk::new(0.001, 1.5, 0.3, 1.2);
        let h = 1e-6;
        let (r, phi) = (0.9, 0.2);
        let (fr, fphi) = disk.forces(r, phi, 0.0);
        let dr = -(disk.potential(r + h, phi, 0.0) - disk.potential(r - h, phi, 0.0)) / (2.0 * h);
        let dphi = -(disk.potential(r, phi + h, 0.0) - disk.potential(r, phi - h, 0.0)) / (2.0 * h);
        assert!((fr - dr).abs() < 1e-10);
        assert!((fphi - dphi).abs() < 1e-10);
    }

    #[test]
    fn r1_rescales_amplitude() {
        let disk = EllipticalDisk::new(0.01, 2.0, 0.0, 2.0);
        assert!((disk.twophio - 0.0025).abs() < 1e-15);
    }
}

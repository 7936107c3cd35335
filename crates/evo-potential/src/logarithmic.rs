//! Logarithmic halo: `Phi = amp/2 ln(R^2 + core^2)`.

use crate::traits::PlanarForce;

/// Axisymmetric logarithmic halo with a flat rotation curve outside the core.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogarithmicHalo {
    pub amp: f64,
    /// Square of the core radius.
    pub core2: f64,
}

impl Default for LogarithmicHalo {
    /// Coreless halo with `vc = 1` everywhere.
    fn default() -> Self {
        Self::normalized(0.0)
    }
}

impl LogarithmicHalo {
    pub const N_ARGS: usize = 2;

    pub fn new(amp: f64, core: f64) -> Self {
        Self {
            amp,
            core2: core * core,
        }
    }

    /// Amplitude chosen so the circular velocity at `R = 1` is 1.
    pub fn normalized(core: f64) -> Self {
        let core2 = core * core;
        Self {
            amp: 1.0 + core2,
            core2,
        }
    }

    pub fn args(&self) -> [f64; Self::N_ARGS] {
        [self.amp, self.core2]
    }

    pub fn from_args(a: &[f64]) -> Self {
        Self {
            amp: a[0],
            core2: a[1],
        }
    }

    /// `Phi(R)` up to a constant.
    pub fn potential(&self, r: f64) -> f64 {
        0.5 * self.amp * (r * r + self.core2).ln()
    }
}

impl PlanarForce for LogarithmicHalo {
    #[inline]
    fn forces(&self, r: f64, _phi: f64, _t: f64) -> (f64, f64) {
        (-self.amp * r / (r * r + self.core2), 0.0)
    }

    fn is_axisymmetric(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_halo_is_flat() {
        let halo = LogarithmicHalo::default();
        for r in [0.5, 1.0, 2.0] {
            let vc2 = -r * halo.rforce(r, 0.3, 1.0);
            assert!((vc2 - 1.0).abs() < 1e-14);
        }
        let cored = LogarithmicHalo::normalized(0.2);
        assert!((-cored.rforce(1.0, 0.0, 0.0) - 1.0).abs() < 1e-14);
    }

    #[test]
    fn rforce_matches_potential_gradient() {
        let halo = LogarithmicHalo::new(1.3, 0.4);
        let (r, h) = (0.9, 1e-5);
        let fd = -(halo.potential(r + h) - halo.potential(r - h)) / (2.0 * h);
        assert!((fd - halo.rforce(r, 0.0, 0.0)).abs() < 1e-9);
    }
}

//! Miyamoto-Nagai disk: `Phi = -amp / sqrt(R^2 + (a + sqrt(z^2 + b^2))^2)`.

use crate::traits::PlanarForce;

/// Three-dimensional Miyamoto-Nagai disk. Only its midplane forces are used.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MiyamotoNagai {
    pub amp: f64,
    pub a: f64,
    pub b: f64,
}

impl MiyamotoNagai {
    pub const N_ARGS: usize = 3;

    pub fn new(amp: f64, a: f64, b: f64) -> Self {
        Self { amp, a, b }
    }

    /// Amplitude chosen so the midplane circular velocity at `R = 1` is 1.
    pub fn normalized(a: f64, b: f64) -> Self {
        let s2 = (a + b) * (a + b);
        Self {
            amp: (1.0 + s2).powf(1.5),
            a,
            b,
        }
    }

    pub fn args(&self) -> [f64; Self::N_ARGS] {
        [self.amp, self.a, self.b]
    }

    pub fn from_args(a: &[f64]) -> Self {
        Self {
            amp: a[0],
            a: a[1],
            b: a[2],
        }
    }

    pub fn potential(&self, r: f64, z: f64) -> f64 {
        let zb = self.a + (z * z + self.b * self.b).sqrt();
        -self.amp / (r * r + zb * zb).sqrt()
    }
}

impl PlanarForce for MiyamotoNagai {
    #[inline]
    fn forces(&self, r: f64, _phi: f64, _t: f64) -> (f64, f64) {
        let ab = self.a + self.b;
        let d2 = r * r + ab * ab;
        (-self.amp * r / (d2 * d2.sqrt()), 0.0)
    }

    fn is_axisymmetric(&self) -> bool {
        true
    }
}

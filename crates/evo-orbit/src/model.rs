//! OrbitModel trait: the force field an orbit is integrated in.

use evo_potential::PlanarForce;

use crate::error::OrbitResult;

/// Acceleration field in Cartesian coordinates.
///
/// Implementations must be pure functions of `(t, pos)`; the same model is
/// shared by every orbit of a velocity grid.
pub trait OrbitModel: Sync {
    /// `[ax, ay]` at position `[x, y]` and time `t`.
    fn acceleration(&self, t: f64, pos: [f64; 2]) -> OrbitResult<[f64; 2]>;
}

/// Any planar force field, typically a compiled `ForceTable`.
///
/// Non-finite forces (for example at `R = 0`) are passed through and
/// detected by the integrator on the resulting state.
impl<P: PlanarForce + Sync> OrbitModel for P {
    #[inline]
    fn acceleration(&self, t: f64, pos: [f64; 2]) -> OrbitResult<[f64; 2]> {
        let [x, y] = pos;
        let r2 = x * x + y * y;
        let r = r2.sqrt();
        let (fr, fphi) = self.forces(r, y.atan2(x), t);
        Ok([fr * x / r - fphi * y / r2, fr * y / r + fphi * x / r2])
    }
}

//! Force evaluation interface shared by all potentials.

/// A planar force field that may depend on time.
///
/// `phiforce` follows the convention `-dPhi/dphi`, so the tangential
/// acceleration is `phiforce / R`.
///
/// Implementations are deterministic functions of `(R, phi, t)` and
/// parameters, suitable for parallel evaluation.
pub trait PlanarForce {
    /// Radial and azimuthal force at `(r, phi)` and time `t`.
    fn forces(&self, r: f64, phi: f64, t: f64) -> (f64, f64);

    /// Radial force `-dPhi/dR`.
    fn rforce(&self, r: f64, phi: f64, t: f64) -> f64 {
        self.forces(r, phi, t).0
    }

    /// Azimuthal force `-dPhi/dphi`.
    fn phiforce(&self, r: f64, phi: f64, t: f64) -> f64 {
        self.forces(r, phi, t).1
    }

    /// True when the force does not depend on `phi` or `t`.
    fn is_axisymmetric(&self) -> bool {
        false
    }
}

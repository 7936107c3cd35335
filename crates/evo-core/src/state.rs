//! Planar phase-space state.
//!
//! The array layout `[R, vR, vT, phi]` is the one used at every boundary
//! that exchanges raw numbers (parameter files, trajectory matrices).

use std::f64::consts::TAU;

/// Position and velocity of a test particle in the disk plane.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseState {
    /// Galactocentric radius
    pub r: f64,
    /// Radial velocity
    pub vr: f64,
    /// Tangential (rotational) velocity
    pub vt: f64,
    /// Azimuth (radians)
    pub phi: f64,
}

impl PhaseState {
    pub fn new(r: f64, vr: f64, vt: f64, phi: f64) -> Self {
        Self { r, vr, vt, phi }
    }

    /// Build from `[R, vR, vT, phi]`.
    pub fn from_array(a: [f64; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }

    /// `[R, vR, vT, phi]`.
    pub fn to_array(self) -> [f64; 4] {
        [self.r, self.vr, self.vt, self.phi]
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.vr.is_finite() && self.vt.is_finite() && self.phi.is_finite()
    }

    /// Angular momentum per unit mass.
    pub fn angular_momentum(&self) -> f64 {
        self.r * self.vt
    }

    /// `[x, y, vx, vy]`.
    pub fn to_cartesian(self) -> [f64; 4] {
        let (s, c) = self.phi.sin_cos();
        [
            self.r * c,
            self.r * s,
            self.vr * c - self.vt * s,
            self.vr * s + self.vt * c,
        ]
    }

    /// Inverse of [`PhaseState::to_cartesian`].
    ///
    /// The azimuth is shifted by whole turns to lie within half a turn of
    /// `phi_ref`, so a sequence of conversions stays continuous.
    pub fn from_cartesian(c: [f64; 4], phi_ref: f64) -> Self {
        let [x, y, vx, vy] = c;
        let r = x.hypot(y);
        let mut phi = y.atan2(x);
        if phi_ref.is_finite() {
            phi += TAU * ((phi_ref - phi) / TAU).round();
        }
        Self {
            r,
            vr: (x * vx + y * vy) / r,
            vt: (x * vy - y * vx) / r,
            phi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartesian_round_trip_keeps_azimuth_branch() {
        let s = PhaseState::new(0.9, 0.1, 1.1, 7.0);
        let back = PhaseState::from_cartesian(s.to_cartesian(), s.phi);
        assert!((back.r - s.r).abs() < 1e-14);
        assert!((back.vr - s.vr).abs() < 1e-14);
        assert!((back.vt - s.vt).abs() < 1e-14);
        assert!((back.phi - s.phi).abs() < 1e-12);
    }

    #[test]
    fn array_order_is_r_vr_vt_phi() {
        let s = PhaseState::from_array([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.vt, 3.0);
        assert_eq!(s.phi, 4.0);
        assert_eq!(s.to_array(), [1.0, 2.0, 3.0, 4.0]);
    }
}

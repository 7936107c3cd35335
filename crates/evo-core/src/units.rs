// evo-core/src/units.rs
//
// Everything in the engine runs in natural units: the circular velocity at
// the reference radius is 1 and that radius is 1. NaturalUnits maps those
// numbers onto SI quantities for reporting.

use uom::si::f64::{Frequency, Length, Time, Velocity};
use uom::si::frequency::hertz;
use uom::si::length::meter;
use uom::si::time::second;
use uom::si::velocity::meter_per_second;

pub const KPC_M: f64 = 3.085_677_581_491_367e19;
pub const KMS_MPS: f64 = 1.0e3;
pub const GYR_S: f64 = 3.155_76e16;

/// Reference radius and velocity that define the natural units.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NaturalUnits {
    /// Reference radius (kpc)
    pub ro_kpc: f64,
    /// Circular velocity at the reference radius (km/s)
    pub vo_kms: f64,
}

impl Default for NaturalUnits {
    fn default() -> Self {
        Self {
            ro_kpc: 8.0,
            vo_kms: 220.0,
        }
    }
}

impl NaturalUnits {
    #[inline]
    pub fn length(&self, r: f64) -> Length {
        Length::new::<meter>(r * self.ro_kpc * KPC_M)
    }

    #[inline]
    pub fn velocity(&self, v: f64) -> Velocity {
        Velocity::new::<meter_per_second>(v * self.vo_kms * KMS_MPS)
    }

    #[inline]
    pub fn time(&self, t: f64) -> Time {
        Time::new::<second>(t * self.ro_kpc * KPC_M / (self.vo_kms * KMS_MPS))
    }

    /// Rates such as Oort constants (natural unit: vo / ro).
    #[inline]
    pub fn frequency(&self, x: f64) -> Frequency {
        Frequency::new::<hertz>(x * self.vo_kms * KMS_MPS / (self.ro_kpc * KPC_M))
    }

    /// Velocity in km/s.
    pub fn kms(&self, v: f64) -> f64 {
        self.velocity(v).get::<meter_per_second>() / KMS_MPS
    }

    /// Velocity squared in (km/s)^2, for dispersions.
    pub fn kms2(&self, v2: f64) -> f64 {
        v2 * self.vo_kms * self.vo_kms
    }

    /// Rate in km/s/kpc.
    pub fn kms_per_kpc(&self, x: f64) -> f64 {
        self.frequency(x).get::<hertz>() * KPC_M / KMS_MPS
    }

    /// Time in Gyr.
    pub fn gyr(&self, t: f64) -> f64 {
        self.time(t).get::<second>() / GYR_S
    }
}

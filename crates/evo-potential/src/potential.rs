//! The potential catalogue and its parameter-block encoding.

use std::fmt;
use std::sync::Arc;

use crate::dehnen_bar::DehnenBar;
use crate::elliptical::EllipticalDisk;
use crate::error::{PotentialError, PotentialResult};
use crate::logarithmic::LogarithmicHalo;
use crate::miyamoto_nagai::MiyamotoNagai;
use crate::spiral::SteadyLogSpiral;
use crate::traits::PlanarForce;

/// Integer tag identifying a potential kind in a parameter block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PotentialKind {
    LogarithmicHalo = 0,
    DehnenBar = 1,
    SteadyLogSpiral = 2,
    EllipticalDisk = 3,
    MiyamotoNagai = 4,
}

impl PotentialKind {
    /// Number of parameters in this kind's block.
    pub const fn n_args(self) -> usize {
        match self {
            PotentialKind::LogarithmicHalo => LogarithmicHalo::N_ARGS,
            PotentialKind::DehnenBar => DehnenBar::N_ARGS,
            PotentialKind::SteadyLogSpiral => SteadyLogSpiral::N_ARGS,
            PotentialKind::EllipticalDisk => EllipticalDisk::N_ARGS,
            PotentialKind::MiyamotoNagai => MiyamotoNagai::N_ARGS,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PotentialKind::LogarithmicHalo => "LogarithmicHalo",
            PotentialKind::DehnenBar => "DehnenBar",
            PotentialKind::SteadyLogSpiral => "SteadyLogSpiral",
            PotentialKind::EllipticalDisk => "EllipticalDisk",
            PotentialKind::MiyamotoNagai => "MiyamotoNagai",
        }
    }

    pub const fn is_axisymmetric(self) -> bool {
        matches!(
            self,
            PotentialKind::LogarithmicHalo | PotentialKind::MiyamotoNagai
        )
    }

    pub const fn tag(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for PotentialKind {
    type Error = PotentialError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(PotentialKind::LogarithmicHalo),
            1 => Ok(PotentialKind::DehnenBar),
            2 => Ok(PotentialKind::SteadyLogSpiral),
            3 => Ok(PotentialKind::EllipticalDisk),
            4 => Ok(PotentialKind::MiyamotoNagai),
            _ => Err(PotentialError::UnknownTag { tag }),
        }
    }
}

/// Three-dimensional potentials usable through their midplane forces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RzPotential {
    LogarithmicHalo(LogarithmicHalo),
    MiyamotoNagai(MiyamotoNagai),
}

impl RzPotential {
    fn planar(&self) -> &dyn PlanarForce {
        match self {
            RzPotential::LogarithmicHalo(p) => p,
            RzPotential::MiyamotoNagai(p) => p,
        }
    }
}

/// A planar potential known to the engine.
///
/// `Custom` wraps an arbitrary force field. It can be evaluated directly but
/// cannot be compiled into a [`crate::ForceTable`].
#[derive(Clone)]
pub enum Potential {
    LogarithmicHalo(LogarithmicHalo),
    DehnenBar(DehnenBar),
    SteadyLogSpiral(SteadyLogSpiral),
    EllipticalDisk(EllipticalDisk),
    FromRz(RzPotential),
    Custom(Arc<dyn PlanarForce + Send + Sync>),
}

impl fmt::Debug for Potential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Potential::LogarithmicHalo(p) => f.debug_tuple("LogarithmicHalo").field(p).finish(),
            Potential::DehnenBar(p) => f.debug_tuple("DehnenBar").field(p).finish(),
            Potential::SteadyLogSpiral(p) => f.debug_tuple("SteadyLogSpiral").field(p).finish(),
            Potential::EllipticalDisk(p) => f.debug_tuple("EllipticalDisk").field(p).finish(),
            Potential::FromRz(p) => f.debug_tuple("FromRz").field(p).finish(),
            Potential::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<LogarithmicHalo> for Potential {
    fn from(p: LogarithmicHalo) -> Self {
        Potential::LogarithmicHalo(p)
    }
}

impl From<DehnenBar> for Potential {
    fn from(p: DehnenBar) -> Self {
        Potential::DehnenBar(p)
    }
}

impl From<SteadyLogSpiral> for Potential {
    fn from(p: SteadyLogSpiral) -> Self {
        Potential::SteadyLogSpiral(p)
    }
}

impl From<EllipticalDisk> for Potential {
    fn from(p: EllipticalDisk) -> Self {
        Potential::EllipticalDisk(p)
    }
}

impl From<MiyamotoNagai> for Potential {
    fn from(p: MiyamotoNagai) -> Self {
        Potential::FromRz(RzPotential::MiyamotoNagai(p))
    }
}

impl Potential {
    /// Kind tag and parameter block for this potential.
    pub fn param_block(&self) -> PotentialResult<(PotentialKind, Vec<f64>)> {
        Ok(match self {
            Potential::LogarithmicHalo(p) | Potential::FromRz(RzPotential::LogarithmicHalo(p)) => {
                (PotentialKind::LogarithmicHalo, p.args().to_vec())
            }
            Potential::DehnenBar(p) => (PotentialKind::DehnenBar, p.args().to_vec()),
            Potential::SteadyLogSpiral(p) => (PotentialKind::SteadyLogSpiral, p.args().to_vec()),
            Potential::EllipticalDisk(p) => (PotentialKind::EllipticalDisk, p.args().to_vec()),
            Potential::FromRz(RzPotential::MiyamotoNagai(p)) => {
                (PotentialKind::MiyamotoNagai, p.args().to_vec())
            }
            Potential::Custom(_) => {
                return Err(PotentialError::Unsupported {
                    what: "custom force field has no parameter block".to_string(),
                });
            }
        })
    }

    fn planar(&self) -> &dyn PlanarForce {
        match self {
            Potential::LogarithmicHalo(p) => p,
            Potential::DehnenBar(p) => p,
            Potential::SteadyLogSpiral(p) => p,
            Potential::EllipticalDisk(p) => p,
            Potential::FromRz(p) => p.planar(),
            Potential::Custom(p) => p.as_ref(),
        }
    }
}

impl PlanarForce for Potential {
    fn forces(&self, r: f64, phi: f64, t: f64) -> (f64, f64) {
        self.planar().forces(r, phi, t)
    }

    fn is_axisymmetric(&self) -> bool {
        self.planar().is_axisymmetric()
    }
}

/// Summed forces of a list of potentials, evaluated without compilation.
pub fn evaluate_forces(pots: &[Potential], r: f64, phi: f64, t: f64) -> (f64, f64) {
    pots.iter().fold((0.0, 0.0), |(fr, fp), p| {
        let (dr, dp) = p.forces(r, phi, t);
        (fr + dr, fp + dp)
    })
}

//! Flat, validated encoding of a potential list for repeated evaluation.
//!
//! Orbit integration evaluates forces millions of times per grid, so the
//! list is resolved once into tags and a contiguous parameter buffer.

use crate::dehnen_bar::DehnenBar;
use crate::elliptical::EllipticalDisk;
use crate::error::{PotentialError, PotentialResult};
use crate::logarithmic::LogarithmicHalo;
use crate::miyamoto_nagai::MiyamotoNagai;
use crate::potential::{Potential, PotentialKind};
use crate::spiral::SteadyLogSpiral;
use crate::traits::PlanarForce;

#[derive(Clone, Debug, PartialEq)]
pub struct ForceTable {
    kinds: Vec<PotentialKind>,
    offsets: Vec<usize>,
    args: Vec<f64>,
}

impl ForceTable {
    /// Resolve a potential list. Fails on the first entry without a
    /// parameter block.
    pub fn compile(pots: &[Potential]) -> PotentialResult<Self> {
        if pots.is_empty() {
            return Err(PotentialError::InvalidArg {
                what: "potential list is empty",
            });
        }
        let mut table = ForceTable {
            kinds: Vec::with_capacity(pots.len()),
            offsets: Vec::with_capacity(pots.len()),
            args: Vec::new(),
        };
        for pot in pots {
            let (kind, block) = pot.param_block()?;
            table.push(kind, &block)?;
        }
        Ok(table)
    }

    /// Build from raw tags and a concatenated argument buffer.
    pub fn from_raw(tags: &[i32], args: &[f64]) -> PotentialResult<Self> {
        if tags.is_empty() {
            return Err(PotentialError::InvalidArg {
                what: "potential list is empty",
            });
        }
        let kinds = tags
            .iter()
            .map(|&t| PotentialKind::try_from(t))
            .collect::<PotentialResult<Vec<_>>>()?;
        let expected: usize = kinds.iter().map(|k| k.n_args()).sum();
        if expected != args.len() {
            return Err(PotentialError::MalformedParameters {
                kind: "force table",
                expected,
                got: args.len(),
            });
        }
        let mut table = ForceTable {
            kinds: Vec::with_capacity(kinds.len()),
            offsets: Vec::with_capacity(kinds.len()),
            args: Vec::with_capacity(args.len()),
        };
        let mut at = 0;
        for kind in kinds {
            let n = kind.n_args();
            table.push(kind, &args[at..at + n])?;
            at += n;
        }
        Ok(table)
    }

    fn push(&mut self, kind: PotentialKind, block: &[f64]) -> PotentialResult<()> {
        if block.len() != kind.n_args() {
            return Err(PotentialError::MalformedParameters {
                kind: kind.name(),
                expected: kind.n_args(),
                got: block.len(),
            });
        }
        if block.iter().any(|v| v.is_nan()) {
            return Err(PotentialError::InvalidArg {
                what: "potential parameter is NaN",
            });
        }
        self.kinds.push(kind);
        self.offsets.push(self.args.len());
        self.args.extend_from_slice(block);
        Ok(())
    }

    /// Tags and argument buffer, suitable for [`ForceTable::from_raw`].
    pub fn raw(&self) -> (Vec<i32>, &[f64]) {
        (self.kinds.iter().map(|k| k.tag()).collect(), &self.args)
    }

    pub fn kinds(&self) -> &[PotentialKind] {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    fn block(&self, i: usize) -> &[f64] {
        let start = self.offsets[i];
        &self.args[start..start + self.kinds[i].n_args()]
    }
}

impl PlanarForce for ForceTable {
    #[inline]
    fn forces(&self, r: f64, phi: f64, t: f64) -> (f64, f64) {
        let mut fr = 0.0;
        let mut fphi = 0.0;
        for (i, kind) in self.kinds.iter().enumerate() {
            let a = self.block(i);
            let (dr, dp) = match kind {
                PotentialKind::LogarithmicHalo => LogarithmicHalo::from_args(a).forces(r, phi, t),
                PotentialKind::DehnenBar => DehnenBar::from_args(a).forces(r, phi, t),
                PotentialKind::SteadyLogSpiral => SteadyLogSpiral::from_args(a).forces(r, phi, t),
                PotentialKind::EllipticalDisk => EllipticalDisk::from_args(a).forces(r, phi, t),
                PotentialKind::MiyamotoNagai => MiyamotoNagai::from_args(a).forces(r, phi, t),
            };
            fr += dr;
            fphi += dp;
        }
        (fr, fphi)
    }

    fn is_axisymmetric(&self) -> bool {
        self.kinds.iter().all(|k| k.is_axisymmetric())
    }
}

//! Query points, sampling options and injected moments.

use evo_core::AdaptiveOptions;

use crate::error::{EdfError, EdfResult};

/// Spatial point and time at which the evolved DF is queried.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvalPoint {
    pub r: f64,
    pub phi: f64,
    pub t: f64,
}

impl EvalPoint {
    pub fn new(r: f64, phi: f64, t: f64) -> Self {
        Self { r, phi, t }
    }

    pub(crate) fn validate(&self) -> EdfResult<()> {
        if !(self.r.is_finite() && self.r > 0.0 && self.phi.is_finite() && self.t.is_finite()) {
            return Err(EdfError::Configuration(format!(
                "evaluation point must be finite with R > 0, got {self:?}"
            )));
        }
        Ok(())
    }

    pub fn with_r(self, r: f64) -> Self {
        Self { r, ..self }
    }

    pub fn with_phi(self, phi: f64) -> Self {
        Self { phi, ..self }
    }
}

/// Velocity grid construction.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridOptions {
    /// Nodes per velocity axis
    pub gridpoints: usize,
    /// Half-width of the window in dispersions
    pub nsigma: f64,
    /// Refine heavy cells on a finer lattice
    pub hierarchical: bool,
    /// Cells holding more than this fraction of the total weight are refined
    pub refine_fraction: f64,
    /// Nodes per axis of each refined cell, corners included
    pub subgridpoints: usize,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            gridpoints: 31,
            nsigma: 4.0,
            hierarchical: false,
            refine_fraction: 1e-4,
            subgridpoints: 3,
        }
    }
}

impl GridOptions {
    pub fn validate(&self) -> EdfResult<()> {
        if self.gridpoints < 3 {
            return Err(EdfError::Configuration(
                "gridpoints must be at least 3".to_string(),
            ));
        }
        if !(self.nsigma.is_finite() && self.nsigma > 0.0) {
            return Err(EdfError::Configuration("nsigma must be positive".to_string()));
        }
        if self.hierarchical {
            if self.subgridpoints < 2 {
                return Err(EdfError::Configuration(
                    "subgridpoints must be at least 2".to_string(),
                ));
            }
            if self.refine_fraction.is_nan() || self.refine_fraction < 0.0 {
                return Err(EdfError::Configuration(
                    "refine_fraction must be non-negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Nested adaptive quadrature without a stored grid.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DirectOptions {
    pub epsrel: f64,
    pub epsabs: f64,
    pub max_subdivisions: usize,
    /// Half-width of the window in dispersions
    pub nsigma: f64,
}

impl Default for DirectOptions {
    fn default() -> Self {
        let adaptive = AdaptiveOptions::default();
        Self {
            epsrel: adaptive.epsrel,
            epsabs: adaptive.epsabs,
            max_subdivisions: adaptive.max_subdivisions,
            nsigma: 4.0,
        }
    }
}

impl DirectOptions {
    pub(crate) fn adaptive(&self) -> AdaptiveOptions {
        AdaptiveOptions {
            epsabs: self.epsabs,
            epsrel: self.epsrel,
            max_subdivisions: self.max_subdivisions,
        }
    }
}

/// Primary and derivative grids for Oort constants.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OortOptions {
    pub grid: GridOptions,
    /// Nodes per axis of the derivative grids
    pub deriv_gridpoints: usize,
    pub delta_r: f64,
    pub delta_phi: f64,
}

impl Default for OortOptions {
    fn default() -> Self {
        Self {
            grid: GridOptions::default(),
            deriv_gridpoints: 31,
            delta_r: 0.01,
            delta_phi: 0.01,
        }
    }
}

impl OortOptions {
    pub fn deriv_grid(&self) -> GridOptions {
        GridOptions {
            gridpoints: self.deriv_gridpoints,
            ..self.grid
        }
    }
}

/// Lower moments supplied by the caller instead of recomputed.
///
/// Values are used as given.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KnownMoments {
    pub surface_mass: Option<f64>,
    pub mean_vr: Option<f64>,
    pub mean_vt: Option<f64>,
    pub sigma_r2: Option<f64>,
    pub sigma_t2: Option<f64>,
    pub sigma_rt: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let g = GridOptions::default();
        assert_eq!(g.gridpoints, 31);
        assert_eq!(g.nsigma, 4.0);
        assert!(!g.hierarchical);
        let d = DirectOptions::default();
        assert_eq!(d.epsrel, 1e-6);
        assert_eq!(d.epsabs, 1e-10);
        assert_eq!(d.max_subdivisions, 50);
        let o = OortOptions::default();
        assert_eq!(o.deriv_grid().gridpoints, 31);
        assert_eq!(o.delta_r, 0.01);
    }

    #[test]
    fn invalid_grid_options() {
        let bad = GridOptions {
            gridpoints: 2,
            ..GridOptions::default()
        };
        assert!(bad.validate().is_err());
        let bad = GridOptions {
            hierarchical: true,
            subgridpoints: 1,
            ..GridOptions::default()
        };
        assert!(bad.validate().is_err());
        assert!(EvalPoint::new(0.0, 0.0, 0.0).validate().is_err());
    }
}

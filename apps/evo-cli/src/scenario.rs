//! YAML scenario files.
//!
//! ```yaml
//! version: 1
//! t0: -10.0
//! potentials:
//!   - type: logarithmic_halo
//!   - type: steady_log_spiral
//!     a: -0.005
//!     omegas: 0.2
//! df:
//!   type: dehnen
//!   beta: 0.0
//! point: { r: 0.9, phi: 0.2, t: 0.0 }
//! ```

use std::path::Path;

use evo_core::NaturalUnits;
use evo_df::DehnenDf;
use evo_moments::{EvalPoint, GridOptions, OortOptions};
use evo_orbit::IntegrationOptions;
use evo_potential::{
    DehnenBar, EllipticalDisk, LogarithmicHalo, MiyamotoNagai, Potential, RzPotential,
    SteadyLogSpiral, growth_window,
};
use serde::Deserialize;

use crate::error::{CliError, CliResult};

pub const SCENARIO_VERSION: u32 = 1;

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub version: u32,
    pub t0: f64,
    pub potentials: Vec<PotentialConfig>,
    #[serde(default)]
    pub df: DfConfig,
    pub point: EvalPoint,
    #[serde(default)]
    pub integration: IntegrationOptions,
    #[serde(default)]
    pub grid: GridOptions,
    #[serde(default)]
    pub derivatives: DerivativeConfig,
    #[serde(default)]
    pub physical: Option<NaturalUnits>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PotentialConfig {
    LogarithmicHalo(HaloConfig),
    DehnenBar(BarConfig),
    SteadyLogSpiral(SpiralConfig),
    EllipticalDisk(EllipticalConfig),
    MiyamotoNagai(DiskConfig),
}

/// Halo normalised to `vc(1) = 1` unless `amp` is given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HaloConfig {
    pub core: f64,
    pub amp: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BarConfig {
    pub rolr: f64,
    pub alpha: f64,
    pub barphi_deg: f64,
    /// Formation time in bar periods
    pub tform_periods: f64,
    /// Growth duration in bar periods
    pub growth_periods: f64,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            rolr: 0.9,
            alpha: 0.01,
            barphi_deg: 25.0,
            tform_periods: -4.0,
            growth_periods: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpiralConfig {
    pub a: f64,
    pub alpha: f64,
    pub m: f64,
    pub omegas: f64,
    pub gamma: f64,
    pub pitch_angle_deg: Option<f64>,
    pub tform: Option<f64>,
    pub tsteady: Option<f64>,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        let d = SteadyLogSpiral::default();
        Self {
            a: d.a,
            alpha: d.alpha,
            m: d.m,
            omegas: d.omegas,
            gamma: d.gamma,
            pitch_angle_deg: None,
            tform: None,
            tsteady: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EllipticalConfig {
    pub twophio: f64,
    pub p: f64,
    pub phib_deg: f64,
    pub r1: f64,
    pub tform: Option<f64>,
    pub tsteady: Option<f64>,
}

impl Default for EllipticalConfig {
    fn default() -> Self {
        Self {
            twophio: 0.01,
            p: 1.0,
            phib_deg: 25.0,
            r1: 1.0,
            tform: None,
            tsteady: None,
        }
    }
}

/// Miyamoto-Nagai disk, normalised unless `amp` is given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    pub a: f64,
    pub b: f64,
    pub amp: Option<f64>,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            a: 0.5,
            b: 0.0375,
            amp: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DfConfig {
    Dehnen(DehnenDf),
}

impl Default for DfConfig {
    fn default() -> Self {
        DfConfig::Dehnen(DehnenDf::default())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DerivativeConfig {
    pub deriv_gridpoints: usize,
    pub delta_r: f64,
    pub delta_phi: f64,
}

impl Default for DerivativeConfig {
    fn default() -> Self {
        let d = OortOptions::default();
        Self {
            deriv_gridpoints: d.deriv_gridpoints,
            delta_r: d.delta_r,
            delta_phi: d.delta_phi,
        }
    }
}

impl PotentialConfig {
    pub fn build(&self) -> CliResult<Potential> {
        let growth = |tform, tsteady| {
            growth_window(tform, tsteady, 2.0).map_err(|e| CliError::Scenario(e.to_string()))
        };
        Ok(match self {
            PotentialConfig::LogarithmicHalo(s) => match s.amp {
                Some(amp) => LogarithmicHalo::new(amp, s.core).into(),
                None => LogarithmicHalo::normalized(s.core).into(),
            },
            PotentialConfig::DehnenBar(s) => DehnenBar::from_resonance(
                s.rolr,
                s.alpha,
                s.barphi_deg.to_radians(),
                s.tform_periods,
                s.growth_periods,
            )
            .into(),
            PotentialConfig::SteadyLogSpiral(s) => {
                let mut sp = SteadyLogSpiral {
                    a: s.a,
                    alpha: s.alpha,
                    m: s.m,
                    omegas: s.omegas,
                    gamma: s.gamma,
                    ..SteadyLogSpiral::default()
                };
                if let Some(p) = s.pitch_angle_deg {
                    sp = sp.with_pitch_angle(p.to_radians());
                }
                (sp.tform, sp.tsteady) = growth(s.tform, s.tsteady)?;
                sp.into()
            }
            PotentialConfig::EllipticalDisk(s) => {
                let mut disk = EllipticalDisk::new(s.twophio, s.p, s.phib_deg.to_radians(), s.r1);
                (disk.tform, disk.tsteady) = growth(s.tform, s.tsteady)?;
                disk.into()
            }
            PotentialConfig::MiyamotoNagai(s) => {
                let mn = match s.amp {
                    Some(amp) => MiyamotoNagai::new(amp, s.a, s.b),
                    None => MiyamotoNagai::normalized(s.a, s.b),
                };
                Potential::FromRz(RzPotential::MiyamotoNagai(mn))
            }
        })
    }
}

impl Scenario {
    pub fn from_yaml(text: &str) -> CliResult<Self> {
        let scenario: Scenario =
            serde_yaml::from_str(text).map_err(|e| CliError::Scenario(e.to_string()))?;
        if scenario.version != SCENARIO_VERSION {
            return Err(CliError::Scenario(format!(
                "unsupported scenario version {} (expected {SCENARIO_VERSION})",
                scenario.version
            )));
        }
        if scenario.potentials.is_empty() {
            return Err(CliError::Scenario("no potentials given".to_string()));
        }
        scenario.potentials()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ScenarioRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn potentials(&self) -> CliResult<Vec<Potential>> {
        self.potentials.iter().map(PotentialConfig::build).collect()
    }

    pub fn initial_df(&self) -> DehnenDf {
        match &self.df {
            DfConfig::Dehnen(df) => *df,
        }
    }

    pub fn oort_options(&self) -> OortOptions {
        OortOptions {
            grid: self.grid,
            deriv_gridpoints: self.derivatives.deriv_gridpoints,
            delta_r: self.derivatives.delta_r,
            delta_phi: self.derivatives.delta_phi,
        }
    }
}

//! Exponential surface-density and dispersion profiles.

/// `Sigma(R) = exp(-R / h_r)` and `sigma_R^2(R) = sigma0^2 exp(-2 (R - 1) / h_sigma)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExpProfile {
    /// Disk scale length
    pub h_r: f64,
    /// Dispersion scale length
    pub h_sigma: f64,
    /// Radial dispersion at `R = 1`
    pub sigma0: f64,
}

impl Default for ExpProfile {
    fn default() -> Self {
        Self {
            h_r: 1.0 / 3.0,
            h_sigma: 1.0,
            sigma0: 0.2,
        }
    }
}

impl ExpProfile {
    pub fn ln_surface_mass(&self, r: f64) -> f64 {
        -r / self.h_r
    }

    pub fn surface_mass(&self, r: f64) -> f64 {
        self.ln_surface_mass(r).exp()
    }

    pub fn ln_sigma2(&self, r: f64) -> f64 {
        2.0 * self.sigma0.ln() - 2.0 * (r - 1.0) / self.h_sigma
    }

    pub fn sigma2(&self, r: f64) -> f64 {
        self.ln_sigma2(r).exp()
    }
}

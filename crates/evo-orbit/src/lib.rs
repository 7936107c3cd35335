//! evo-orbit: test-particle orbits in planar, time-dependent potentials.
//!
//! Provides:
//! - `OrbitModel`: Cartesian acceleration fields (any `PlanarForce`)
//! - Leapfrog and sixth-order Runge-Kutta steppers
//! - Step-doubling drivers producing trajectories at requested times

pub mod error;
pub mod integrate;
pub mod integrator;
pub mod model;

pub use error::{OrbitError, OrbitResult};
pub use integrate::{
    IntegrationMethod, IntegrationOptions, IntegrationStats, Trajectory, integrate,
    integrate_compiled, integrate_model,
};
pub use integrator::{Integrator, Leapfrog, Rk6};
pub use model::OrbitModel;

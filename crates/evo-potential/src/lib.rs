//! evo-potential: planar gravitational potentials and their force tables.
//!
//! Potentials are plain parameter structs implementing [`PlanarForce`].
//! [`ForceTable`] resolves a list of them into a tagged parameter buffer
//! that the orbit integrator evaluates in its inner loop.

pub mod common;
pub mod dehnen_bar;
pub mod elliptical;
pub mod error;
pub mod logarithmic;
pub mod miyamoto_nagai;
pub mod potential;
pub mod spiral;
pub mod table;
pub mod traits;

pub use common::{ALWAYS_ON, growth_factor, growth_window};
pub use dehnen_bar::DehnenBar;
pub use elliptical::EllipticalDisk;
pub use error::{PotentialError, PotentialResult};
pub use logarithmic::LogarithmicHalo;
pub use miyamoto_nagai::MiyamotoNagai;
pub use potential::{Potential, PotentialKind, RzPotential, evaluate_forces};
pub use spiral::SteadyLogSpiral;
pub use table::ForceTable;
pub use traits::PlanarForce;

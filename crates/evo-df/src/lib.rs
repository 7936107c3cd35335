//! evo-df: steady-state planar distribution functions.
//!
//! The evolved-DF engine only needs point evaluations of the initial DF
//! ([`InitialDf`]); the static moments here are used for window sizing and
//! as reference values in tests.

pub mod dehnen;
pub mod moments;
pub mod profile;
pub mod traits;

pub use dehnen::DehnenDf;
pub use moments::{StaticMoments, StaticQuadrature, static_moments, static_oort_a, static_oort_b};
pub use profile::ExpProfile;
pub use traits::{InitialDf, VelocityScales};

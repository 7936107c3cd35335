//! evo-moments: velocity moments of an evolved disk distribution function.
//!
//! The DF at `(R, phi, t)` is the initial DF evaluated at the end of orbits
//! integrated back to `t0`. Moments come from:
//! - flat velocity grids with composite Simpson quadrature
//! - hierarchical grids refining the heaviest cells
//! - nested adaptive quadrature (no grid)
//!
//! Grids are returned to the caller and can be passed back for further
//! moments at the same point; Oort constants use two extra derivative grids.
//! A [`GridSeries`] holds grids at one point for a list of times.

pub mod edf;
pub mod error;
pub mod grid;
pub mod hierarchical;
pub mod moments;
pub mod oort;
pub mod options;
pub mod series;

pub use edf::{EvolvedDiskDf, NodeValue, VelocityWindow};
pub use error::{EdfError, EdfResult, ErrorKind};
pub use grid::{FailedNode, Grid, VelocityGrid};
pub use hierarchical::HierarchicalGrid;
pub use moments::{MomentSet, Sampling, vertex_deviation_deg};
pub use oort::{DerivAxis, DerivativeGrid, OortConstants, OortGrids};
pub use options::{DirectOptions, EvalPoint, GridOptions, KnownMoments, OortOptions};
pub use series::{GridSeries, SeriesSampling};

//! Decorative prop placement
//!
//! Prop types, per-role weight tables and the constraint solver that fills
//! room floors.

mod solver;
mod types;

pub use solver::{PropCell, PropPlacementSolver, PropSolution};
pub use types::{PropMask, PropType, PropWeights, RolePropWeights};

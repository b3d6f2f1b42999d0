//! World implementations for the harness runner.

pub mod chain;
pub mod grid;
pub mod plateau;

pub use chain::ChainWorld;
pub use grid::{Cell, GridEncoder, GridWorld};
pub use plateau::PlateauWorld;

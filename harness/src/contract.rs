//! World contract: what a world must provide to be run by the harness.
//!
//! A world provides:
//! - A transition system (initial state, goal test, successors)
//! - Evaluators that understand its states
//! - Human-readable state labels for reports
//!
//! A world does NOT provide:
//! - Frontiers, tactics or controllers (search's job)
//! - Report assembly or digests (runner's job)

use pathwise_kernel::{RegistryError, StateHandle, TransitionSystem};
use pathwise_search::EvaluatorGateway;
use thiserror::Error;

/// The contract a world must implement to be run by [`crate::runner::run_search`].
pub trait SearchWorld: TransitionSystem {
    /// A fresh evaluator gateway for one run.
    fn evaluators(&self) -> EvaluatorGateway;

    /// Label for `state` in reports. Defaults to the handle.
    fn describe(&self, state: StateHandle) -> String {
        state.to_string()
    }
}

/// Typed failure for world construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("world needs at least one state")]
    Empty,
    #[error("map row {row} has width {actual}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown map character {ch:?} at ({x}, {y})")]
    UnknownCell { ch: char, x: usize, y: usize },
    #[error("map needs exactly one {marker:?}, found {count}")]
    Marker { marker: char, count: usize },
    #[error("world is too large for u32 handles")]
    TooLarge,
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

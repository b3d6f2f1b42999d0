//! Pathwise Kernel: the task model consumed by the search core.
//!
//! # API Surface
//!
//! - [`handle::StateHandle`] / [`handle::OperatorId`] -- opaque identifiers
//! - [`task::TransitionSystem`] -- initial state, goal test, successor generation
//! - [`registry::StateRegistry`] -- bijective interning of concrete states
//! - [`plan::Plan`] -- the solution returned by a successful search
//!
//! # Module Dependency Direction
//!
//! `handle` ← `registry`, `task` ← `plan`
//!
//! One-way only. The kernel knows nothing about frontiers, evaluators or
//! controllers; those live in `pathwise_search`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod handle;
pub mod plan;
pub mod registry;
pub mod task;

pub use handle::{OperatorId, StateHandle};
pub use plan::{Plan, PlanStep};
pub use registry::{RegistryError, StateRegistry};
pub use task::TransitionSystem;

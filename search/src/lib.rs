//! Pathwise Search: adaptive heuristic search with a learned tactic controller.
//!
//! This crate provides the search layer. It depends only on `pathwise_kernel`
//! and does NOT depend on `pathwise_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! pathwise_kernel  ←  pathwise_search  ←  pathwise_harness
//! (task model)        (frontiers, tactics,  (worlds, heuristic server,
//!                      controller)           runner)
//! ```
//!
//! # Key types
//!
//! - [`frontier::Frontier`] -- open-list interface (heap, bucket, alternation)
//! - [`node::NodeStore`] -- per-state status, `g` and back edge, with reopening
//! - [`evaluator::EvaluatorGateway`] -- local and remote evaluators behind one call
//! - [`tactic::Tactic`] -- one bounded unit of search work per step
//! - [`controller::Controller`] -- periodic tactic selection and learning
//! - [`engine::SearchEngine`] -- the driver tying the above together
//!
//! # Determinism
//!
//! Every random choice draws from the single [`SearchRng`] owned by the run and
//! seeded from [`config::SearchConfig::seed`]. Two runs with the same task,
//! evaluators and configuration expand the same states in the same order,
//! except under time-based control intervals.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod checkpoint;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod frontier;
pub mod node;
pub mod space;
pub mod stats;
pub mod tactic;

/// The random generator threaded through frontiers, tactics and policies.
pub type SearchRng = rand_chacha::ChaCha8Rng;

pub use config::{ActionInterval, ControllerKind, FrontierKind, SearchConfig, SearchKnobs};
pub use controller::{Controller, Directive};
pub use engine::{FailureReason, SearchEngine, SearchOutcome, SearchStatus};
pub use error::SearchError;
pub use evaluator::{EvaluationResult, Evaluator, EvaluatorGateway};
pub use stats::SearchStatistics;
pub use tactic::TacticKind;

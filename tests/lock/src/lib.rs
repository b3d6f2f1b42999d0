//! Shared fixtures for the cross-crate lock tests.
//!
//! - [`graph_task::GraphTask`] -- explicit weighted digraph with a fixed
//!   heuristic table, for scenarios the toy worlds cannot express
//! - [`canonical_run`] -- the one run the `run_fixture` binary and the
//!   in-process determinism tests both execute

#![forbid(unsafe_code)]

pub mod graph_task;

//! Pathwise Harness: worlds and orchestration around the search core.
//!
//! The harness runs a world through `pathwise_search::SearchEngine` and
//! packages the result as a digest-stamped [`runner::RunReport`]. It also
//! hosts the server side of the remote evaluation protocol.
//!
//! The harness does NOT implement search logic; it delegates to the search
//! crate. Worlds provide domain data only; the harness owns orchestration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod runner;
pub mod server;
pub mod worlds;

pub use contract::{SearchWorld, WorldError};
pub use runner::{run_search, run_with_evaluators, RunError, RunReport};

//! Harness runner: drives a search engine over a world and packages the
//! result as a digest-stamped report.
//!
//! # Pipeline
//!
//! ```text
//! world.evaluators() → SearchEngine::new() → run()
//!   → plan labels (operator names, state labels)
//!   → report JSON without digest → sha256 → digest
//! ```
//!
//! The runner implements no search logic itself; it only orchestrates and
//! records.

use std::collections::BTreeMap;

use pathwise_kernel::TransitionSystem;
use pathwise_search::{
    EvaluatorGateway, SearchConfig, SearchEngine, SearchError, SearchStatistics, SearchStatus,
};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::contract::SearchWorld;

/// Error during a harness run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Engine construction rejected the configuration or evaluators.
    #[error("search setup failed: {0}")]
    Setup(#[from] SearchError),
    /// Report serialization failed.
    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything one run produced, in a stable JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub world: String,
    pub seed: u64,
    pub status: SearchStatus,
    /// Operator names along the plan; empty when unsolved.
    pub plan: Vec<String>,
    /// State labels from the initial state to the goal; empty when unsolved.
    pub path: Vec<String>,
    pub plan_cost: Option<u64>,
    pub statistics: SearchStatistics,
    /// Control periods per tactic name.
    pub tactic_usage: BTreeMap<String, u64>,
    /// `sha256:<hex>` over the canonical JSON of every other field.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub digest: String,
}

impl RunReport {
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.status == SearchStatus::Solved
    }

    /// Digest of the report with its `digest` field cleared.
    ///
    /// # Errors
    ///
    /// [`RunError::Serialize`] if serialization fails.
    pub fn compute_digest(&self) -> Result<String, RunError> {
        let unsigned = Self {
            digest: String::new(),
            ..self.clone()
        };
        let bytes = serde_json::to_vec(&unsigned)?;
        Ok(format!("sha256:{}", hex::encode(Sha256::digest(&bytes))))
    }

    /// Whether the stored digest matches the content.
    #[must_use]
    pub fn verify_digest(&self) -> bool {
        self.compute_digest().is_ok_and(|d| d == self.digest)
    }

    /// Pretty JSON, digest included.
    ///
    /// # Errors
    ///
    /// [`RunError::Serialize`] if serialization fails.
    pub fn to_json(&self) -> Result<String, RunError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run `world` with its own evaluators.
///
/// # Errors
///
/// Returns [`RunError`] if the engine cannot be built or the report cannot
/// be serialized. Search failures are reported in [`RunReport::status`].
pub fn run_search<W: SearchWorld>(world: &W, config: &SearchConfig) -> Result<RunReport, RunError> {
    run_with_evaluators(world, world.evaluators(), config)
}

/// Run `world` with caller-supplied evaluators (for example a remote one).
///
/// # Errors
///
/// See [`run_search`].
pub fn run_with_evaluators<W: SearchWorld>(
    world: &W,
    evaluators: EvaluatorGateway,
    config: &SearchConfig,
) -> Result<RunReport, RunError> {
    let mut engine = SearchEngine::new(world, evaluators, config)?;
    let outcome = engine.run();

    let (plan, path, plan_cost) = match &outcome.plan {
        Some(plan) => (
            plan.steps()
                .iter()
                .map(|step| world.operator_name(step.operator))
                .collect(),
            plan.states(world.initial_state())
                .into_iter()
                .map(|state| world.describe(state))
                .collect(),
            Some(plan.cost()),
        ),
        None => (Vec::new(), Vec::new(), None),
    };
    let tactic_usage = engine
        .tactic_periods()
        .iter()
        .map(|(kind, periods)| (kind.name().to_string(), *periods))
        .collect();

    let mut report = RunReport {
        world: world.task_id().to_string(),
        seed: config.seed,
        status: outcome.status,
        plan,
        path,
        plan_cost,
        statistics: outcome.statistics,
        tactic_usage,
        digest: String::new(),
    };
    report.digest = report.compute_digest()?;
    info!(
        event = "run_report",
        world = %report.world,
        solved = report.is_solved(),
        digest = %report.digest
    );
    Ok(report)
}

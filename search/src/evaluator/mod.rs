//! Evaluator gateway: heuristic estimates, dead-end flags and preferred
//! operators for one state.
//!
//! An [`Evaluator`] scores a single state. The [`EvaluatorGateway`] owns every
//! evaluator of a run and tags each with its role: *priority* evaluators feed
//! the frontier keys, *preferred* evaluators contribute preferred operators.
//! One evaluator may hold both roles, in which case a single call serves both.

mod linear;
pub mod remote;
pub mod wire;

use pathwise_kernel::{OperatorId, StateHandle};

use crate::error::SearchError;

pub use linear::{FeatureEncoder, LinearEvaluator, LinearModel};
pub use remote::RemoteEvaluator;

/// Upper bound on frontier keys; keeps clear of the sentinel values the heap uses.
const KEY_LIMIT: f64 = 4_611_686_018_427_387_904.0; // 2^62

/// Outcome of evaluating one state with one evaluator.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub scalar: f64,
    pub dead_end: bool,
    pub preferred_ops: Vec<OperatorId>,
}

impl EvaluationResult {
    #[must_use]
    pub fn value(scalar: f64) -> Self {
        Self {
            scalar,
            dead_end: false,
            preferred_ops: Vec::new(),
        }
    }

    #[must_use]
    pub fn dead_end() -> Self {
        Self {
            scalar: f64::INFINITY,
            dead_end: true,
            preferred_ops: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_preferred(mut self, ops: Vec<OperatorId>) -> Self {
        self.preferred_ops = ops;
        self
    }

    /// Integer frontier key: the scalar rounded to nearest and clamped.
    /// Dead ends and non-finite scalars map to the largest key.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn key(&self) -> i64 {
        if self.dead_end || !self.scalar.is_finite() {
            return KEY_LIMIT as i64;
        }
        self.scalar.round().clamp(-KEY_LIMIT, KEY_LIMIT) as i64
    }
}

/// A state evaluator.
pub trait Evaluator {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Evaluate `state`, reached with path cost `g`.
    ///
    /// # Errors
    ///
    /// Only evaluators backed by I/O fail; the error aborts the search.
    fn evaluate(&mut self, state: StateHandle, g: u64) -> Result<EvaluationResult, SearchError>;

    /// Whether a reported dead end is guaranteed to be one.
    fn dead_ends_are_reliable(&self) -> bool {
        true
    }
}

/// Adapter turning a closure into an [`Evaluator`].
pub struct FnEvaluator<F> {
    name: String,
    reliable: bool,
    f: F,
}

impl<F> FnEvaluator<F>
where
    F: FnMut(StateHandle, u64) -> EvaluationResult,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            reliable: true,
            f,
        }
    }

    /// Mark dead ends from this evaluator as unreliable.
    #[must_use]
    pub fn unreliable(mut self) -> Self {
        self.reliable = false;
        self
    }
}

impl<F> Evaluator for FnEvaluator<F>
where
    F: FnMut(StateHandle, u64) -> EvaluationResult,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&mut self, state: StateHandle, g: u64) -> Result<EvaluationResult, SearchError> {
        Ok((self.f)(state, g))
    }

    fn dead_ends_are_reliable(&self) -> bool {
        self.reliable
    }
}

/// Evaluator returning 0 everywhere; turns best-first into breadth-first.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlindEvaluator;

impl Evaluator for BlindEvaluator {
    fn name(&self) -> &str {
        "blind"
    }

    fn evaluate(&mut self, _state: StateHandle, _g: u64) -> Result<EvaluationResult, SearchError> {
        Ok(EvaluationResult::value(0.0))
    }
}

/// Per-state evaluation across all evaluators of a gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// One result per priority evaluator, in registration order.
    pub results: Vec<EvaluationResult>,
    /// Reliability flag per priority evaluator.
    pub reliable: Vec<bool>,
    /// Union of preferred operators, first-seen order. Empty unless requested.
    pub preferred_ops: Vec<OperatorId>,
}

impl Evaluation {
    /// Frontier keys, one per priority evaluator.
    #[must_use]
    pub fn keys(&self) -> Vec<i64> {
        self.results.iter().map(EvaluationResult::key).collect()
    }

    /// Progress heuristic: the key of the first priority evaluator.
    #[must_use]
    pub fn h(&self) -> Option<i64> {
        self.results.first().map(EvaluationResult::key)
    }

    #[must_use]
    pub fn is_preferred(&self, op: OperatorId) -> bool {
        self.preferred_ops.contains(&op)
    }
}

struct Slot {
    evaluator: Box<dyn Evaluator>,
    priority: bool,
    preferred: bool,
}

/// Owns the evaluators of a run.
#[derive(Default)]
pub struct EvaluatorGateway {
    slots: Vec<Slot>,
    evaluations: u64,
}

impl std::fmt::Debug for EvaluatorGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.slots.iter().map(|s| s.evaluator.name()).collect();
        f.debug_struct("EvaluatorGateway")
            .field("evaluators", &names)
            .field("evaluations", &self.evaluations)
            .finish()
    }
}

impl EvaluatorGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway with a single priority evaluator.
    #[must_use]
    pub fn single(evaluator: impl Evaluator + 'static) -> Self {
        Self::new().with_priority(evaluator)
    }

    /// Add an evaluator that feeds frontier keys.
    #[must_use]
    pub fn with_priority(self, evaluator: impl Evaluator + 'static) -> Self {
        self.with_slot(Box::new(evaluator), true, false)
    }

    /// Add an evaluator consulted only for preferred operators.
    #[must_use]
    pub fn with_preferred(self, evaluator: impl Evaluator + 'static) -> Self {
        self.with_slot(Box::new(evaluator), false, true)
    }

    /// Add an evaluator holding both roles.
    #[must_use]
    pub fn with_priority_and_preferred(self, evaluator: impl Evaluator + 'static) -> Self {
        self.with_slot(Box::new(evaluator), true, true)
    }

    /// Add a boxed evaluator with explicit roles.
    #[must_use]
    pub fn with_slot(mut self, evaluator: Box<dyn Evaluator>, priority: bool, preferred: bool) -> Self {
        self.slots.push(Slot {
            evaluator,
            priority,
            preferred,
        });
        self
    }

    /// Number of evaluators feeding frontier keys.
    #[must_use]
    pub fn priority_count(&self) -> usize {
        self.slots.iter().filter(|s| s.priority).count()
    }

    /// Whether any evaluator supplies preferred operators.
    #[must_use]
    pub fn has_preferred(&self) -> bool {
        self.slots.iter().any(|s| s.preferred)
    }

    /// Total state evaluations performed.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Evaluate `state` at path cost `g`.
    ///
    /// Preferred-only evaluators run only when `want_preferred` is set.
    ///
    /// # Errors
    ///
    /// Propagates the first evaluator failure.
    pub fn evaluate(
        &mut self,
        state: StateHandle,
        g: u64,
        want_preferred: bool,
    ) -> Result<Evaluation, SearchError> {
        self.evaluations += 1;
        let mut evaluation = Evaluation {
            results: Vec::with_capacity(self.slots.len()),
            reliable: Vec::with_capacity(self.slots.len()),
            preferred_ops: Vec::new(),
        };
        for slot in &mut self.slots {
            if !slot.priority && !(slot.preferred && want_preferred) {
                continue;
            }
            let result = slot.evaluator.evaluate(state, g)?;
            if slot.preferred && want_preferred {
                for op in &result.preferred_ops {
                    if !evaluation.preferred_ops.contains(op) {
                        evaluation.preferred_ops.push(*op);
                    }
                }
            }
            if slot.priority {
                evaluation
                    .reliable
                    .push(slot.evaluator.dead_ends_are_reliable());
                evaluation.results.push(result);
            }
        }
        Ok(evaluation)
    }
}

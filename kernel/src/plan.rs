//! Solution plans.

use crate::handle::{OperatorId, StateHandle};

/// One transition of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanStep {
    pub operator: OperatorId,
    pub from: StateHandle,
    pub to: StateHandle,
    pub cost: u32,
}

/// An operator sequence from the initial state to a goal state.
///
/// Steps are ordered from the root. An empty plan means the initial state
/// already satisfies the goal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<PlanStep>,
}

impl Plan {
    #[must_use]
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    #[must_use]
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of step costs.
    #[must_use]
    pub fn cost(&self) -> u64 {
        self.steps.iter().map(|s| u64::from(s.cost)).sum()
    }

    /// Operator sequence.
    #[must_use]
    pub fn operators(&self) -> Vec<OperatorId> {
        self.steps.iter().map(|s| s.operator).collect()
    }

    /// The state sequence visited by the plan, starting at `root`.
    #[must_use]
    pub fn states(&self, root: StateHandle) -> Vec<StateHandle> {
        let mut out = Vec::with_capacity(self.steps.len() + 1);
        out.push(root);
        out.extend(self.steps.iter().map(|s| s.to));
        out
    }
}

//! `ChainWorld`: named states on a line, one unit-cost operator per edge.
//!
//! `ChainWorld::abcd()` is the four-state graph `A → B → C → D` with goal `D`
//! and heuristic "remaining hops".

use pathwise_kernel::{OperatorId, StateHandle, TransitionSystem};
use pathwise_search::evaluator::FnEvaluator;
use pathwise_search::{EvaluationResult, EvaluatorGateway};

use crate::contract::{SearchWorld, WorldError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainWorld {
    names: Vec<String>,
}

impl ChainWorld {
    /// Chain over `names`; the last one is the goal.
    ///
    /// # Errors
    ///
    /// [`WorldError::Empty`] for an empty list, [`WorldError::TooLarge`] past
    /// `u32` handles.
    pub fn new(names: Vec<String>) -> Result<Self, WorldError> {
        if names.is_empty() {
            return Err(WorldError::Empty);
        }
        if u32::try_from(names.len()).is_err() {
            return Err(WorldError::TooLarge);
        }
        Ok(Self { names })
    }

    #[must_use]
    pub fn abcd() -> Self {
        Self {
            names: ["A", "B", "C", "D"].map(String::from).to_vec(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of `state`, or `"?"` for a foreign handle.
    #[must_use]
    pub fn name(&self, state: StateHandle) -> &str {
        self.names.get(state.index()).map_or("?", String::as_str)
    }

    fn last(&self) -> usize {
        self.names.len() - 1
    }
}

impl TransitionSystem for ChainWorld {
    #[allow(clippy::unnecessary_literal_bound)]
    fn task_id(&self) -> &str {
        "chain"
    }

    fn initial_state(&self) -> StateHandle {
        StateHandle::new(0)
    }

    fn is_goal(&self, state: StateHandle) -> bool {
        state.index() == self.last()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn applicable_operators(&self, state: StateHandle, out: &mut Vec<OperatorId>) {
        // operator i leads from state i to state i + 1; lengths fit u32
        if state.index() < self.last() {
            out.push(OperatorId::new(state.index() as u32));
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn successor(&self, _state: StateHandle, op: OperatorId) -> StateHandle {
        StateHandle::new(op.index() as u32 + 1)
    }

    fn operator_cost(&self, _op: OperatorId) -> u32 {
        1
    }

    fn operator_name(&self, op: OperatorId) -> String {
        let i = op.index();
        format!(
            "{}->{}",
            self.names.get(i).map_or("?", String::as_str),
            self.names.get(i + 1).map_or("?", String::as_str)
        )
    }
}

impl SearchWorld for ChainWorld {
    #[allow(clippy::cast_precision_loss)]
    fn evaluators(&self) -> EvaluatorGateway {
        let last = self.last();
        EvaluatorGateway::single(FnEvaluator::new(
            "remaining_hops",
            move |state: StateHandle, _g: u64| {
                EvaluationResult::value(last.saturating_sub(state.index()) as f64)
            },
        ))
    }

    fn describe(&self, state: StateHandle) -> String {
        self.name(state).to_string()
    }
}

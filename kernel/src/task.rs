//! Planning task contract.

use crate::handle::{OperatorId, StateHandle};

/// A sequential decision problem the search can expand.
///
/// Implementors own state packing and deduplication; the search only sees
/// [`StateHandle`]s. Every method takes `&self`: a task is read-only for the
/// whole run, so successor generation must intern new states through interior
/// mutability (see [`crate::StateRegistry`]).
///
/// # Contract
///
/// - `successor` must return the same handle for the same resulting state
///   (handles are deduplicated).
/// - `applicable_operators` must be deterministic: same state, same operators
///   in the same order.
/// - `operator_cost` is non-negative by construction (`u32`).
pub trait TransitionSystem {
    /// Unique task identifier, used in reports and logs.
    fn task_id(&self) -> &str;

    /// Handle of the initial state.
    fn initial_state(&self) -> StateHandle;

    /// Goal test.
    fn is_goal(&self, state: StateHandle) -> bool;

    /// Append every operator applicable in `state` to `out`.
    fn applicable_operators(&self, state: StateHandle, out: &mut Vec<OperatorId>);

    /// Apply `op` to `state`. `op` must be applicable.
    fn successor(&self, state: StateHandle, op: OperatorId) -> StateHandle;

    /// Cost of applying `op`.
    fn operator_cost(&self, op: OperatorId) -> u32;

    /// Diagnostic operator name.
    fn operator_name(&self, op: OperatorId) -> String {
        op.to_string()
    }
}

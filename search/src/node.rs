//! Node store: per-state search bookkeeping.
//!
//! Every state the search has touched has a [`SearchNode`] with a status, the
//! cheapest known path cost `g` and a back edge to its parent. Status moves
//! forward only:
//!
//! ```text
//! New -> Open -> Closed
//!         ^        |        (reopen, only when enabled)
//!         +--------+
//! any -> DeadEnd            (terminal)
//! ```
//!
//! Invariant violations are programming errors and are checked with
//! `debug_assert!`.

use std::collections::HashMap;

use pathwise_kernel::{OperatorId, Plan, PlanStep, StateHandle, TransitionSystem};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    New,
    Open,
    Closed,
    DeadEnd,
}

/// How a node was reached: `operator` applied in `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackEdge {
    pub operator: OperatorId,
    pub parent: StateHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchNode {
    pub status: NodeStatus,
    pub g: u64,
    pub back_edge: Option<BackEdge>,
}

impl SearchNode {
    const NEW: Self = Self {
        status: NodeStatus::New,
        g: 0,
        back_edge: None,
    };
}

/// Mapping from state handle to [`SearchNode`]. Untouched states are `New`.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: HashMap<StateHandle, SearchNode>,
    reopen_closed: bool,
    reopened: u64,
}

impl NodeStore {
    #[must_use]
    pub fn new(reopen_closed: bool) -> Self {
        Self {
            nodes: HashMap::new(),
            reopen_closed,
            reopened: 0,
        }
    }

    #[must_use]
    pub fn reopen_closed(&self) -> bool {
        self.reopen_closed
    }

    #[must_use]
    pub fn node(&self, state: StateHandle) -> SearchNode {
        self.nodes.get(&state).copied().unwrap_or(SearchNode::NEW)
    }

    #[must_use]
    pub fn status(&self, state: StateHandle) -> NodeStatus {
        self.node(state).status
    }

    /// Path cost of a touched state.
    #[must_use]
    pub fn g(&self, state: StateHandle) -> Option<u64> {
        self.nodes.get(&state).map(|n| n.g)
    }

    /// Number of touched states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Times a closed node was moved back to `Open`.
    #[must_use]
    pub fn reopened(&self) -> u64 {
        self.reopened
    }

    #[must_use]
    pub fn count(&self, status: NodeStatus) -> usize {
        self.nodes.values().filter(|n| n.status == status).count()
    }

    /// Open the root with `g = 0` and no parent.
    pub fn open_initial(&mut self, state: StateHandle) {
        debug_assert_eq!(self.status(state), NodeStatus::New, "root opened twice");
        self.nodes.insert(
            state,
            SearchNode {
                status: NodeStatus::Open,
                g: 0,
                back_edge: None,
            },
        );
    }

    /// Path cost of reaching a child of `parent` through an edge of `cost`.
    #[must_use]
    pub fn child_g(&self, parent: StateHandle, cost: u32) -> u64 {
        self.node(parent).g + u64::from(cost)
    }

    /// Open a `New` state reached from `parent` via `operator`.
    pub fn open(&mut self, state: StateHandle, parent: StateHandle, operator: OperatorId, cost: u32) {
        debug_assert_eq!(self.status(state), NodeStatus::New, "open on touched node");
        let g = self.child_g(parent, cost);
        self.nodes.insert(
            state,
            SearchNode {
                status: NodeStatus::Open,
                g,
                back_edge: Some(BackEdge { operator, parent }),
            },
        );
    }

    /// Move an `Open` or `Closed` state back to `Open` on a strictly cheaper path.
    pub fn reopen(&mut self, state: StateHandle, parent: StateHandle, operator: OperatorId, cost: u32) {
        let g = self.child_g(parent, cost);
        let node = self.nodes.entry(state).or_insert(SearchNode::NEW);
        debug_assert!(
            matches!(node.status, NodeStatus::Open | NodeStatus::Closed),
            "reopen on {:?}",
            node.status
        );
        debug_assert!(g < node.g, "reopen must lower g");
        if node.status == NodeStatus::Closed {
            debug_assert!(self.reopen_closed, "reopen while reopening is disabled");
            self.reopened += 1;
        }
        node.status = NodeStatus::Open;
        node.g = g;
        node.back_edge = Some(BackEdge { operator, parent });
    }

    /// Record a strictly cheaper path without touching status or frontier membership.
    pub fn update_parent(
        &mut self,
        state: StateHandle,
        parent: StateHandle,
        operator: OperatorId,
        cost: u32,
    ) {
        let g = self.child_g(parent, cost);
        let node = self.nodes.entry(state).or_insert(SearchNode::NEW);
        debug_assert!(node.status != NodeStatus::New, "update_parent on a new node");
        debug_assert!(g < node.g, "update_parent must lower g");
        node.g = g;
        node.back_edge = Some(BackEdge { operator, parent });
    }

    pub fn close(&mut self, state: StateHandle) {
        let node = self.nodes.entry(state).or_insert(SearchNode::NEW);
        debug_assert_eq!(node.status, NodeStatus::Open, "close on non-open node");
        node.status = NodeStatus::Closed;
    }

    pub fn mark_dead_end(&mut self, state: StateHandle) {
        self.nodes.entry(state).or_insert(SearchNode::NEW).status = NodeStatus::DeadEnd;
    }

    /// Follow back edges from `goal` to the root and build the plan.
    ///
    /// Step costs come from `task`. The chain is bounded by the number of
    /// touched states, so a corrupted store cannot loop forever.
    #[must_use]
    pub fn trace_plan<T: TransitionSystem + ?Sized>(&self, goal: StateHandle, task: &T) -> Plan {
        let mut steps = Vec::new();
        let mut current = goal;
        while let Some(edge) = self.node(current).back_edge {
            debug_assert!(steps.len() <= self.nodes.len(), "cycle in back edges");
            if steps.len() > self.nodes.len() {
                break;
            }
            steps.push(PlanStep {
                operator: edge.operator,
                from: edge.parent,
                to: current,
                cost: task.operator_cost(edge.operator),
            });
            current = edge.parent;
        }
        steps.reverse();
        Plan::new(steps)
    }
}

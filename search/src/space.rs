//! Shared expansion machinery.
//!
//! [`SearchSpace`] bundles everything the tactics operate on: the task, the
//! evaluator gateway, the node store, the frontier set, progress tracking,
//! counters and the run's single random generator. Tactics only decide *which*
//! entry to pop and *where* children go; popping, goal testing, closing,
//! successor processing and rollouts are implemented once here.

use pathwise_kernel::{OperatorId, Plan, StateHandle, TransitionSystem};
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use tracing::trace;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::evaluator::{Evaluation, EvaluatorGateway};
use crate::frontier::{ActiveFrontier, FrontierEntry, FrontierSet, FrontierShape};
use crate::node::{NodeStatus, NodeStore};
use crate::stats::{ProgressTracker, SearchStatistics};
use crate::SearchRng;

/// How an entry is taken from a frontier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pick {
    Min,
    Random,
    Epsilon(f64),
}

/// Result of expanding one non-goal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expanded {
    pub state: StateHandle,
    /// Entries for successors that were opened or improved.
    pub children: Vec<FrontierEntry>,
    /// Operators applicable in `state`, in task order.
    pub operators: Vec<OperatorId>,
    /// Preferred operators of `state`; empty without preferred evaluators.
    pub preferred: Vec<OperatorId>,
    /// Whether a successor beat the best heuristic value so far.
    pub progress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandOutcome {
    Goal(StateHandle),
    Expanded(Expanded),
}

/// How a rollout ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutOutcome {
    Goal(StateHandle),
    Progress,
    /// Length exhausted, no operator left, or the walk hit a closed or dead state.
    Stopped,
}

pub struct SearchSpace<'t> {
    task: &'t dyn TransitionSystem,
    evaluators: EvaluatorGateway,
    nodes: NodeStore,
    frontiers: FrontierSet,
    progress: ProgressTracker,
    stats: SearchStatistics,
    rng: SearchRng,
    history: Option<Vec<StateHandle>>,
}

impl std::fmt::Debug for SearchSpace<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSpace")
            .field("task", &self.task.task_id())
            .field("evaluators", &self.evaluators)
            .field("nodes", &self.nodes.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<'t> SearchSpace<'t> {
    #[must_use]
    pub fn new(task: &'t dyn TransitionSystem, evaluators: EvaluatorGateway, config: &SearchConfig) -> Self {
        let shape = FrontierShape {
            kind: config.frontier,
            priority_evaluators: evaluators.priority_count(),
            with_preferred: evaluators.has_preferred(),
            boost: config.boost,
        };
        Self {
            task,
            evaluators,
            nodes: NodeStore::new(config.reopen_closed),
            frontiers: FrontierSet::new(shape),
            progress: ProgressTracker::new(),
            stats: SearchStatistics::default(),
            rng: SearchRng::seed_from_u64(config.seed),
            history: config.record_expansions.then(Vec::new),
        }
    }

    #[must_use]
    pub fn task(&self) -> &'t dyn TransitionSystem {
        self.task
    }

    #[must_use]
    pub fn nodes(&self) -> &NodeStore {
        &self.nodes
    }

    #[must_use]
    pub fn frontiers(&self) -> &FrontierSet {
        &self.frontiers
    }

    pub fn frontiers_mut(&mut self) -> &mut FrontierSet {
        &mut self.frontiers
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    #[must_use]
    pub fn statistics(&self) -> SearchStatistics {
        SearchStatistics {
            reopened: self.nodes.reopened(),
            ..self.stats
        }
    }

    pub fn rng_mut(&mut self) -> &mut SearchRng {
        &mut self.rng
    }

    /// Expanded states in order, when recording is enabled.
    #[must_use]
    pub fn history(&self) -> Option<&[StateHandle]> {
        self.history.as_deref()
    }

    /// Evaluate and open the initial state.
    ///
    /// Returns `false` if the initial state is a dead end.
    ///
    /// # Errors
    ///
    /// Evaluator failure.
    pub fn initialize(&mut self) -> Result<bool, SearchError> {
        let root = self.task.initial_state();
        let evaluation = self.evaluate(root, 0, false)?;
        if self.frontiers.global().is_dead_end(&evaluation) {
            self.nodes.mark_dead_end(root);
            self.stats.dead_ends += 1;
            return Ok(false);
        }
        self.nodes.open_initial(root);
        if let Some(h) = evaluation.h() {
            self.progress.start(h);
        }
        self.frontiers
            .global_mut()
            .insert(FrontierEntry::new(root, evaluation.keys(), false));
        Ok(true)
    }

    /// Pop the next live entry, discarding stale copies of states that are no
    /// longer open.
    pub fn pop(&mut self, which: ActiveFrontier, pick: Pick) -> Option<FrontierEntry> {
        loop {
            let frontier = self.frontiers.get_mut(which);
            let entry = match pick {
                Pick::Min => frontier.remove_min(),
                Pick::Random => frontier.remove_random(&mut self.rng),
                Pick::Epsilon(epsilon) => frontier.remove_epsilon(epsilon, &mut self.rng),
            }?;
            if self.nodes.status(entry.handle) == NodeStatus::Open {
                return Some(entry);
            }
            self.stats.stale_pops += 1;
        }
    }

    /// Whether `state` is still open, i.e. a popped entry for it is live.
    #[must_use]
    pub fn is_open(&self, state: StateHandle) -> bool {
        self.nodes.status(state) == NodeStatus::Open
    }

    /// Goal-test, close and expand an open state.
    ///
    /// # Errors
    ///
    /// Evaluator failure.
    pub fn expand(&mut self, state: StateHandle) -> Result<ExpandOutcome, SearchError> {
        debug_assert!(self.is_open(state), "expanding a state that is not open");
        self.stats.expanded += 1;
        if let Some(history) = &mut self.history {
            history.push(state);
        }
        if self.task.is_goal(state) {
            return Ok(ExpandOutcome::Goal(state));
        }
        self.nodes.close(state);
        self.progress.record_expansion();
        let best_before = self.progress.best_h();

        let preferred = if self.evaluators.has_preferred() {
            let g = self.nodes.g(state).unwrap_or(0);
            self.evaluate(state, g, true)?.preferred_ops
        } else {
            Vec::new()
        };

        let operators = self.applicable(state);
        let mut children = Vec::with_capacity(operators.len());
        for &op in &operators {
            let child = self.task.successor(state, op);
            if let Some(entry) = self.process_successor(state, op, child, preferred.contains(&op))? {
                children.push(entry);
            }
        }
        let progress = self.progress.best_h() < best_before;
        trace!(
            event = "expand",
            state = %state,
            children = children.len(),
            stall = self.progress.expansions_without_progress()
        );
        Ok(ExpandOutcome::Expanded(Expanded {
            state,
            children,
            operators,
            preferred,
            progress,
        }))
    }

    /// Apply the node-store rules to one generated successor.
    ///
    /// Returns the frontier entry to insert when the successor was opened, or
    /// reached on a cheaper path with reopening enabled. Without reopening a
    /// cheaper path to an open or closed node only rewrites its back edge.
    /// Dead ends, stale paths and parent-only updates return `None`.
    ///
    /// # Errors
    ///
    /// Evaluator failure.
    pub fn process_successor(
        &mut self,
        parent: StateHandle,
        op: OperatorId,
        child: StateHandle,
        preferred: bool,
    ) -> Result<Option<FrontierEntry>, SearchError> {
        self.stats.generated += 1;
        let cost = self.task.operator_cost(op);
        let g = self.nodes.child_g(parent, cost);
        let node = self.nodes.node(child);
        match node.status {
            NodeStatus::DeadEnd => Ok(None),
            NodeStatus::New => {
                let evaluation = self.evaluate(child, g, false)?;
                if self.frontiers.global().is_dead_end(&evaluation) {
                    self.nodes.mark_dead_end(child);
                    self.stats.dead_ends += 1;
                    return Ok(None);
                }
                self.nodes.open(child, parent, op, cost);
                self.observe(&evaluation);
                Ok(Some(FrontierEntry::new(child, evaluation.keys(), preferred)))
            }
            NodeStatus::Open | NodeStatus::Closed if g < node.g => {
                if !self.nodes.reopen_closed() {
                    self.nodes.update_parent(child, parent, op, cost);
                    return Ok(None);
                }
                let evaluation = self.evaluate(child, g, false)?;
                if self.frontiers.global().is_dead_end(&evaluation) {
                    self.nodes.mark_dead_end(child);
                    self.stats.dead_ends += 1;
                    return Ok(None);
                }
                self.nodes.reopen(child, parent, op, cost);
                self.observe(&evaluation);
                Ok(Some(FrontierEntry::new(child, evaluation.keys(), preferred)))
            }
            NodeStatus::Open | NodeStatus::Closed => Ok(None),
        }
    }

    /// Insert entries into the chosen frontier.
    pub fn insert_all(&mut self, which: ActiveFrontier, entries: Vec<FrontierEntry>) {
        let frontier = self.frontiers.get_mut(which);
        for entry in entries {
            frontier.insert(entry);
        }
    }

    /// Merge the local frontier back into the global one.
    pub fn merge_local(&mut self) -> usize {
        let nodes = &self.nodes;
        self.frontiers
            .merge_local(|h| nodes.status(h) == NodeStatus::Open)
    }

    /// Return entries held outside the frontiers to the global frontier.
    pub fn reinsert(&mut self, entries: Vec<FrontierEntry>) -> usize {
        let nodes = &self.nodes;
        self.frontiers
            .reinsert(entries, |h| nodes.status(h) == NodeStatus::Open)
    }

    /// Walk up to `length` steps from an expanded state, each step applying a
    /// random operator and expanding the result. Children of every step go to
    /// `sink`.
    ///
    /// With `preferred_only`, steps choose among the preferred operators when
    /// any is applicable and fall back to all applicable operators otherwise.
    ///
    /// # Errors
    ///
    /// Evaluator failure.
    pub fn rollout(
        &mut self,
        from: &Expanded,
        length: u32,
        preferred_only: bool,
        sink: ActiveFrontier,
    ) -> Result<RolloutOutcome, SearchError> {
        self.stats.rollouts += 1;
        let mut current = from.state;
        let mut operators = from.operators.clone();
        let mut preferred = from.preferred.clone();
        for _ in 0..length {
            let Some(op) = self.choose_operator(&operators, &preferred, preferred_only) else {
                return Ok(RolloutOutcome::Stopped);
            };
            let best_before = self.progress.best_h();
            // Expanding `current` already generated and processed every child.
            let child = self.task.successor(current, op);
            if !self.is_open(child) {
                return Ok(RolloutOutcome::Stopped);
            }
            let expanded = match self.expand(child)? {
                ExpandOutcome::Goal(goal) => return Ok(RolloutOutcome::Goal(goal)),
                ExpandOutcome::Expanded(expanded) => expanded,
            };
            let Expanded {
                children,
                operators: next_ops,
                preferred: next_pref,
                ..
            } = expanded;
            self.insert_all(sink, children);
            if self.progress.best_h() < best_before {
                return Ok(RolloutOutcome::Progress);
            }
            current = child;
            operators = next_ops;
            preferred = next_pref;
        }
        Ok(RolloutOutcome::Stopped)
    }

    /// Plan from the initial state to `goal`.
    #[must_use]
    pub fn plan_to(&self, goal: StateHandle) -> Plan {
        self.nodes.trace_plan(goal, self.task)
    }

    /// Number of evaluator calls so far.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluators.evaluations()
    }

    fn choose_operator(
        &mut self,
        operators: &[OperatorId],
        preferred: &[OperatorId],
        preferred_only: bool,
    ) -> Option<OperatorId> {
        if preferred_only {
            let applicable: Vec<OperatorId> = operators
                .iter()
                .copied()
                .filter(|op| preferred.contains(op))
                .collect();
            if let Some(op) = applicable.choose(&mut self.rng) {
                return Some(*op);
            }
        }
        operators.choose(&mut self.rng).copied()
    }

    fn applicable(&self, state: StateHandle) -> Vec<OperatorId> {
        let mut ops = Vec::new();
        self.task.applicable_operators(state, &mut ops);
        ops
    }

    fn evaluate(&mut self, state: StateHandle, g: u64, want_preferred: bool) -> Result<Evaluation, SearchError> {
        self.stats.evaluated += 1;
        self.evaluators.evaluate(state, g, want_preferred)
    }

    /// Track the first evaluator's value; boost preferred sub-frontiers on progress.
    fn observe(&mut self, evaluation: &Evaluation) {
        let Some(h) = evaluation.h() else {
            return;
        };
        if self.progress.observe(h) && self.evaluators.has_preferred() {
            self.frontiers.active_mut().boost_preferred();
            trace!(event = "boost_preferred", h);
        }
    }
}

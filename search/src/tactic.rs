//! Tactic library.
//!
//! A tactic decides which frontier entry is expanded next and where the
//! children go. The catalogue is closed ([`TacticKind`]); a [`Tactic`] pairs a
//! kind with its transient working state (local frontier step count, probe
//! stack, cycle phase). Switching tactics calls [`Tactic::teardown`], which
//! merges that state back into the global frontier.

use std::fmt;

use pathwise_kernel::StateHandle;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SearchKnobs;
use crate::error::SearchError;
use crate::frontier::{ActiveFrontier, FrontierEntry};
use crate::space::{ExpandOutcome, Expanded, Pick, RolloutOutcome, SearchSpace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticKind {
    /// One `remove_min` expansion per step.
    BestFirst,
    /// One `remove_epsilon(epsilon)` expansion per step.
    EpsilonGreedy,
    /// Best-first, plus a random rollout while stalled.
    StochasticRollout,
    /// Best-first, plus a rollout along preferred operators while stalled.
    PreferredRollout,
    /// Best-first inside a private frontier seeded from the global one.
    LocalSearch,
    /// Depth-first along the best child, siblings kept on a stack.
    DepthFirstProbe,
    /// Global/local cycling with epsilon removal and stalled rollouts, all
    /// driven by [`SearchKnobs`].
    Parametrized,
}

impl TacticKind {
    /// The discrete tactics a bandit or soft-max policy chooses among.
    pub const DISCRETE: [Self; 6] = [
        Self::BestFirst,
        Self::EpsilonGreedy,
        Self::StochasticRollout,
        Self::PreferredRollout,
        Self::LocalSearch,
        Self::DepthFirstProbe,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::BestFirst => "best_first",
            Self::EpsilonGreedy => "epsilon_greedy",
            Self::StochasticRollout => "stochastic_rollout",
            Self::PreferredRollout => "preferred_rollout",
            Self::LocalSearch => "local_search",
            Self::DepthFirstProbe => "depth_first_probe",
            Self::Parametrized => "parametrized",
        }
    }
}

impl fmt::Display for TacticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one tactic step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacticStatus {
    InProgress,
    Solved(StateHandle),
    /// No live entry anywhere the tactic can reach.
    Exhausted,
}

#[derive(Debug)]
enum WorkingState {
    Stateless,
    Local { steps: u32 },
    Probe { stack: Vec<FrontierEntry> },
    Cycle { phase: ActiveFrontier, remaining: u32 },
}

/// A tactic and its transient working state.
#[derive(Debug)]
pub struct Tactic {
    kind: TacticKind,
    state: WorkingState,
}

impl Tactic {
    #[must_use]
    pub fn new(kind: TacticKind) -> Self {
        let state = match kind {
            TacticKind::LocalSearch => WorkingState::Local { steps: 0 },
            TacticKind::DepthFirstProbe => WorkingState::Probe { stack: Vec::new() },
            // The first step closes this empty local phase and opens a global one.
            TacticKind::Parametrized => WorkingState::Cycle {
                phase: ActiveFrontier::Local,
                remaining: 0,
            },
            TacticKind::BestFirst
            | TacticKind::EpsilonGreedy
            | TacticKind::StochasticRollout
            | TacticKind::PreferredRollout => WorkingState::Stateless,
        };
        Self { kind, state }
    }

    #[must_use]
    pub fn kind(&self) -> TacticKind {
        self.kind
    }

    /// Run one bounded unit of work.
    ///
    /// # Errors
    ///
    /// Evaluator failure.
    pub fn step(
        &mut self,
        space: &mut SearchSpace<'_>,
        knobs: &SearchKnobs,
    ) -> Result<TacticStatus, SearchError> {
        match (&mut self.state, self.kind) {
            (WorkingState::Stateless, TacticKind::EpsilonGreedy) => {
                best_first(space, Pick::Epsilon(knobs.epsilon))
            }
            (WorkingState::Stateless, TacticKind::StochasticRollout) => {
                rollout_step(space, knobs, false)
            }
            (WorkingState::Stateless, TacticKind::PreferredRollout) => {
                rollout_step(space, knobs, true)
            }
            (WorkingState::Stateless, _) => best_first(space, Pick::Min),
            (WorkingState::Local { steps }, _) => local_step(space, knobs, steps),
            (WorkingState::Probe { stack }, _) => probe_step(space, stack),
            (WorkingState::Cycle { phase, remaining }, _) => {
                cycle_step(space, knobs, phase, remaining)
            }
        }
    }

    /// Hand every entry the tactic holds back to the global frontier.
    ///
    /// Returns the number of entries merged.
    pub fn teardown(self, space: &mut SearchSpace<'_>) -> usize {
        let merged = match self.state {
            WorkingState::Stateless => 0,
            WorkingState::Local { .. } | WorkingState::Cycle { .. } => space.merge_local(),
            WorkingState::Probe { stack } => space.reinsert(stack),
        };
        if merged > 0 {
            debug!(event = "local_merge", tactic = %self.kind, merged);
        }
        merged
    }
}

/// Expand `entry`; children go to `sink`. `Err(status)` short-circuits on a goal.
fn expand_into(
    space: &mut SearchSpace<'_>,
    entry: &FrontierEntry,
    sink: ActiveFrontier,
) -> Result<Result<Expanded, TacticStatus>, SearchError> {
    match space.expand(entry.handle)? {
        ExpandOutcome::Goal(goal) => Ok(Err(TacticStatus::Solved(goal))),
        ExpandOutcome::Expanded(mut expanded) => {
            let children = std::mem::take(&mut expanded.children);
            space.insert_all(sink, children);
            Ok(Ok(expanded))
        }
    }
}

fn best_first(space: &mut SearchSpace<'_>, pick: Pick) -> Result<TacticStatus, SearchError> {
    let Some(entry) = space.pop(ActiveFrontier::Global, pick) else {
        return Ok(TacticStatus::Exhausted);
    };
    Ok(match expand_into(space, &entry, ActiveFrontier::Global)? {
        Ok(_) => TacticStatus::InProgress,
        Err(status) => status,
    })
}

fn rollout_step(
    space: &mut SearchSpace<'_>,
    knobs: &SearchKnobs,
    preferred_only: bool,
) -> Result<TacticStatus, SearchError> {
    let Some(entry) = space.pop(ActiveFrontier::Global, Pick::Min) else {
        return Ok(TacticStatus::Exhausted);
    };
    let expanded = match expand_into(space, &entry, ActiveFrontier::Global)? {
        Ok(expanded) => expanded,
        Err(status) => return Ok(status),
    };
    if space.progress().is_stalled(knobs.stall_size) {
        let outcome = space.rollout(
            &expanded,
            knobs.rollout_length,
            preferred_only,
            ActiveFrontier::Global,
        )?;
        if let RolloutOutcome::Goal(goal) = outcome {
            return Ok(TacticStatus::Solved(goal));
        }
    }
    Ok(TacticStatus::InProgress)
}

fn local_step(
    space: &mut SearchSpace<'_>,
    knobs: &SearchKnobs,
    steps: &mut u32,
) -> Result<TacticStatus, SearchError> {
    let entry = match space.pop(ActiveFrontier::Local, Pick::Min) {
        Some(entry) if *steps < knobs.local_step_limit => entry,
        popped => {
            // Exhausted or over budget: merge back and re-seed.
            let mut held = Vec::new();
            held.extend(popped);
            let merged = space.reinsert(held) + space.merge_local();
            let Some(seed) = space.pop(ActiveFrontier::Global, Pick::Min) else {
                return Ok(TacticStatus::Exhausted);
            };
            debug!(event = "local_seed", seed = %seed.handle, merged, steps = *steps);
            space.frontiers_mut().activate(ActiveFrontier::Local);
            *steps = 0;
            seed
        }
    };
    *steps += 1;
    Ok(match expand_into(space, &entry, ActiveFrontier::Local)? {
        Ok(_) => TacticStatus::InProgress,
        Err(status) => status,
    })
}

fn probe_step(
    space: &mut SearchSpace<'_>,
    stack: &mut Vec<FrontierEntry>,
) -> Result<TacticStatus, SearchError> {
    let next = loop {
        match stack.pop() {
            Some(entry) if space.is_open(entry.handle) => break Some(entry),
            Some(_) => {}
            None => break space.pop(ActiveFrontier::Global, Pick::Min),
        }
    };
    let Some(entry) = next else {
        return Ok(TacticStatus::Exhausted);
    };
    let mut children = match space.expand(entry.handle)? {
        ExpandOutcome::Goal(goal) => return Ok(TacticStatus::Solved(goal)),
        ExpandOutcome::Expanded(expanded) => expanded.children,
    };
    // Shuffle first so the stable sort leaves equal keys in random order.
    children.shuffle(space.rng_mut());
    children.sort_by_key(|child| child.key(0));
    stack.extend(children.into_iter().rev());
    Ok(TacticStatus::InProgress)
}

fn cycle_step(
    space: &mut SearchSpace<'_>,
    knobs: &SearchKnobs,
    phase: &mut ActiveFrontier,
    remaining: &mut u32,
) -> Result<TacticStatus, SearchError> {
    if *remaining == 0 {
        let next = match *phase {
            ActiveFrontier::Global if knobs.local_limit() > 0 => ActiveFrontier::Local,
            ActiveFrontier::Local if knobs.global_limit() > 0 || knobs.local_limit() == 0 => {
                ActiveFrontier::Global
            }
            same => same,
        };
        if next != *phase {
            switch_phase(space, next);
            *phase = next;
        }
        *remaining = match *phase {
            ActiveFrontier::Global => knobs.global_limit(),
            ActiveFrontier::Local => knobs.local_limit(),
        }
        .max(1);
        space.frontiers_mut().activate(*phase);
    }
    let Some((entry, source)) = cycle_pop(space, *phase, knobs.epsilon) else {
        return Ok(TacticStatus::Exhausted);
    };
    *remaining -= 1;
    let expanded = match expand_into(space, &entry, source)? {
        Ok(expanded) => expanded,
        Err(status) => return Ok(status),
    };
    if space.progress().is_stalled(knobs.stall_size) {
        for _ in 0..knobs.rollout_count {
            match space.rollout(&expanded, knobs.rollout_length, false, source)? {
                RolloutOutcome::Goal(goal) => return Ok(TacticStatus::Solved(goal)),
                RolloutOutcome::Progress => break,
                RolloutOutcome::Stopped => {}
            }
        }
    }
    Ok(TacticStatus::InProgress)
}

/// Leaving the local phase merges the local frontier into the global one;
/// entering it restarts the local frontier from the best global entry.
fn switch_phase(space: &mut SearchSpace<'_>, next: ActiveFrontier) {
    let merged = space.merge_local();
    if next == ActiveFrontier::Global {
        if merged > 0 {
            debug!(event = "local_merge", tactic = %TacticKind::Parametrized, merged);
        }
        return;
    }
    space.frontiers_mut().activate(ActiveFrontier::Local);
    if let Some(seed) = space.pop(ActiveFrontier::Global, Pick::Min) {
        debug!(event = "local_seed", seed = %seed.handle, merged);
        space.insert_all(ActiveFrontier::Local, vec![seed]);
    }
}

/// Pop from the phase's frontier, re-seeding the local frontier from the
/// global one, or falling back to the local one when the global is empty.
fn cycle_pop(
    space: &mut SearchSpace<'_>,
    phase: ActiveFrontier,
    epsilon: f64,
) -> Option<(FrontierEntry, ActiveFrontier)> {
    if let Some(entry) = space.pop(phase, Pick::Epsilon(epsilon)) {
        return Some((entry, phase));
    }
    match phase {
        ActiveFrontier::Local => space
            .pop(ActiveFrontier::Global, Pick::Min)
            .map(|seed| (seed, ActiveFrontier::Local)),
        ActiveFrontier::Global => space
            .pop(ActiveFrontier::Local, Pick::Epsilon(epsilon))
            .map(|entry| (entry, ActiveFrontier::Local)),
    }
}

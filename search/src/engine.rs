//! The search driver: owns the space, the controller and the active tactic.
//!
//! [`SearchEngine::step`] is the unit of progress. On every call it consults
//! the controller when a control period has elapsed, applies the directive
//! (tearing down the previous tactic on a switch), and runs one tactic step.
//! [`SearchEngine::run`] loops `step` until the search is solved, fails, or
//! the optional expansion budget runs out.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use pathwise_kernel::{Plan, TransitionSystem};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{SearchConfig, SearchKnobs};
use crate::controller::{ControlContext, Controller, Directive};
use crate::error::SearchError;
use crate::evaluator::EvaluatorGateway;
use crate::space::SearchSpace;
use crate::stats::SearchStatistics;
use crate::tactic::{Tactic, TacticKind, TacticStatus};

/// Why a search ended without a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No live entry left in any frontier.
    FrontierExhausted,
    InitialStateDeadEnd,
    /// `max_expansions` reached.
    ExpansionBudget,
    /// An evaluator failed; the run was aborted.
    Evaluator(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrontierExhausted => f.write_str("frontier exhausted"),
            Self::InitialStateDeadEnd => f.write_str("initial state is a dead end"),
            Self::ExpansionBudget => f.write_str("expansion budget reached"),
            Self::Evaluator(detail) => write!(f, "evaluator failure: {detail}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    InProgress,
    Solved,
    Failed(FailureReason),
}

/// Final result of [`SearchEngine::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub plan: Option<Plan>,
    pub statistics: SearchStatistics,
}

impl SearchOutcome {
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.status == SearchStatus::Solved
    }
}

pub struct SearchEngine<'t> {
    space: SearchSpace<'t>,
    controller: Controller,
    tactic: Option<Tactic>,
    knobs: SearchKnobs,
    time_budget: Duration,
    max_expansions: Option<u64>,
    status: SearchStatus,
    plan: Option<Plan>,
    started: Option<Instant>,
    tactic_periods: BTreeMap<TacticKind, u64>,
}

impl fmt::Debug for SearchEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchEngine")
            .field("space", &self.space)
            .field("controller", &self.controller.policy_name())
            .field("tactic", &self.active_tactic())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl<'t> SearchEngine<'t> {
    /// Validate `config` and build a fresh engine. The controller loads its
    /// checkpoint here.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidConfig`] when the configuration is rejected or
    /// the gateway has no evaluator feeding frontier keys.
    pub fn new(
        task: &'t dyn TransitionSystem,
        evaluators: EvaluatorGateway,
        config: &SearchConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        if evaluators.priority_count() == 0 {
            return Err(SearchError::invalid(
                "at least one priority evaluator is required",
            ));
        }
        Ok(Self {
            space: SearchSpace::new(task, evaluators, config),
            controller: Controller::from_config(config),
            tactic: None,
            knobs: config.knobs,
            time_budget: Duration::from_millis(config.time_budget_ms),
            max_expansions: config.max_expansions,
            status: SearchStatus::InProgress,
            plan: None,
            started: None,
            tactic_periods: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    /// The plan, once solved.
    #[must_use]
    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    #[must_use]
    pub fn statistics(&self) -> SearchStatistics {
        self.space.statistics()
    }

    /// Expanded states in order, when `record_expansions` is set.
    #[must_use]
    pub fn history(&self) -> Option<&[pathwise_kernel::StateHandle]> {
        self.space.history()
    }

    #[must_use]
    pub fn active_tactic(&self) -> Option<TacticKind> {
        self.tactic.as_ref().map(Tactic::kind)
    }

    /// Knobs currently handed to the tactics.
    #[must_use]
    pub fn knobs(&self) -> &SearchKnobs {
        &self.knobs
    }

    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Control periods spent in each tactic.
    #[must_use]
    pub fn tactic_periods(&self) -> &BTreeMap<TacticKind, u64> {
        &self.tactic_periods
    }

    #[must_use]
    pub fn space(&self) -> &SearchSpace<'t> {
        &self.space
    }

    /// Advance the search by one tactic step.
    ///
    /// Once the status leaves `InProgress` further calls are no-ops.
    ///
    /// # Errors
    ///
    /// Evaluator failure. The engine status is left untouched; [`Self::run`]
    /// turns it into [`FailureReason::Evaluator`].
    pub fn step(&mut self) -> Result<SearchStatus, SearchError> {
        if self.status != SearchStatus::InProgress {
            return Ok(self.status.clone());
        }
        if self.started.is_none() {
            self.started = Some(Instant::now());
            info!(
                event = "search_start",
                task = self.space.task().task_id(),
                controller = self.controller.policy_name()
            );
            if !self.space.initialize()? {
                return Ok(self.finish(SearchStatus::Failed(FailureReason::InitialStateDeadEnd)));
            }
        }

        if self.controller.is_due(self.space.statistics().expanded) {
            let ctx = self.context();
            let directive = self.controller.control(&ctx, self.space.rng_mut());
            self.apply(directive);
        }

        let tactic = self
            .tactic
            .get_or_insert_with(|| Tactic::new(TacticKind::BestFirst));
        let kind = tactic.kind();
        match tactic.step(&mut self.space, &self.knobs)? {
            TacticStatus::InProgress => {}
            TacticStatus::Solved(goal) => {
                self.plan = Some(self.space.plan_to(goal));
                if let Err(e) = self.controller.save() {
                    warn!(event = "checkpoint_failed", error = %e);
                }
                self.finish(SearchStatus::Solved);
            }
            TacticStatus::Exhausted => {
                if let Some(tactic) = self.tactic.take() {
                    tactic.teardown(&mut self.space);
                }
                if self.space.frontiers().global().is_empty() {
                    self.finish(SearchStatus::Failed(FailureReason::FrontierExhausted));
                } else {
                    self.tactic = Some(Tactic::new(kind));
                }
            }
        }
        Ok(self.status.clone())
    }

    /// Step until the search ends.
    pub fn run(&mut self) -> SearchOutcome {
        while self.status == SearchStatus::InProgress {
            if self
                .max_expansions
                .is_some_and(|max| self.space.statistics().expanded >= max)
            {
                self.finish(SearchStatus::Failed(FailureReason::ExpansionBudget));
                break;
            }
            if let Err(e) = self.step() {
                self.finish(SearchStatus::Failed(FailureReason::Evaluator(e.to_string())));
            }
        }
        self.outcome()
    }

    #[must_use]
    pub fn outcome(&self) -> SearchOutcome {
        SearchOutcome {
            status: self.status.clone(),
            plan: self.plan.clone(),
            statistics: self.statistics(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.map_or(Duration::ZERO, |s| s.elapsed())
    }

    fn context(&self) -> ControlContext {
        let progress = self.space.progress();
        ControlContext {
            initial_h: progress.initial_h(),
            best_h: progress.best_h(),
            elapsed: self.elapsed(),
            time_budget: self.time_budget,
            expansions_without_progress: progress.expansions_without_progress(),
            statistics: self.space.statistics(),
        }
    }

    fn apply(&mut self, directive: Directive) {
        let kind = match directive {
            Directive::Tactic(kind) => kind,
            Directive::Knobs(knobs) => {
                self.knobs = knobs;
                TacticKind::Parametrized
            }
        };
        *self.tactic_periods.entry(kind).or_default() += 1;
        if self.active_tactic() == Some(kind) {
            return;
        }
        let previous = self.tactic.take().map(|tactic| {
            let previous = tactic.kind();
            tactic.teardown(&mut self.space);
            previous
        });
        info!(
            event = "tactic_switch",
            from = previous.map_or("none", TacticKind::name),
            to = %kind,
            expanded = self.space.statistics().expanded
        );
        self.tactic = Some(Tactic::new(kind));
    }

    fn finish(&mut self, status: SearchStatus) -> SearchStatus {
        self.status = status;
        let statistics = self.space.statistics();
        info!(
            event = "search_end",
            status = ?self.status,
            expanded = statistics.expanded,
            evaluated = statistics.evaluated,
            plan_cost = self.plan.as_ref().map(Plan::cost),
            elapsed_ms = u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
        );
        self.status.clone()
    }
}

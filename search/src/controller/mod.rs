//! Strategy controller: the periodic meta-loop that picks what runs next.
//!
//! Every control period the controller computes the reward of the period that
//! just ended (`previous best h - current best h`, never negative), lets its
//! [`ControlPolicy`] learn from it, and asks the policy for the next
//! [`Directive`]: either a discrete tactic or a full set of continuous knobs
//! for the parametrized tactic.
//!
//! Policies:
//!
//! - [`FixedPolicy`] -- one tactic, forever
//! - [`BanditPolicy`] -- tabular epsilon-greedy over the discrete tactics
//! - [`SoftmaxPolicy`] -- per-context soft-max over the discrete tactics
//! - [`NetworkPolicy`] -- feed-forward network from run statistics to knobs
//! - [`ParametersPolicy`] -- knobs read from a parameters file
//!
//! Weights are loaded from the checkpoint path at construction (missing or
//! malformed files fall back to defaults) and written back, together with the
//! per-context usage counts, when the search reaches a goal.

mod bandit;
mod network;
mod params;
mod softmax;

use std::collections::VecDeque;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::checkpoint;
use crate::config::{ActionInterval, ControllerKind, SearchConfig, SearchKnobs};
use crate::error::SearchError;
use crate::stats::SearchStatistics;
use crate::tactic::TacticKind;
use crate::SearchRng;

pub use bandit::BanditPolicy;
pub use network::{FeedForward, NetworkPolicy};
pub use params::ParametersPolicy;
pub use softmax::SoftmaxPolicy;

/// What the engine should run until the next control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Directive {
    Tactic(TacticKind),
    Knobs(SearchKnobs),
}

/// A policy decision: the arm index (for usage accounting and learning) and
/// the directive it stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Choice {
    pub arm: usize,
    pub directive: Directive,
}

/// Snapshot of the run handed to policies at every control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlContext {
    pub initial_h: Option<i64>,
    pub best_h: Option<i64>,
    pub elapsed: Duration,
    pub time_budget: Duration,
    pub expansions_without_progress: u64,
    pub statistics: SearchStatistics,
}

/// A pluggable control policy.
pub trait ControlPolicy: Debug {
    fn name(&self) -> &'static str;

    /// Number of arms (rows of the usage table are `contexts() x arms()`).
    fn arms(&self) -> usize;

    fn contexts(&self) -> usize {
        1
    }

    /// Discretized context index for `ctx`, in `0..contexts()`.
    fn context(&self, _ctx: &ControlContext) -> usize {
        0
    }

    fn choose(&mut self, context: usize, ctx: &ControlContext, rng: &mut SearchRng) -> Choice;

    /// Learn from the reward earned by `arm` in `context`.
    fn learn(&mut self, _context: usize, _arm: usize, _reward: f64) {}

    /// Replace the defaults with a checkpoint. Returns `false` (and keeps the
    /// defaults) when the file is missing or malformed.
    fn load(&mut self, path: &Path) -> bool;

    /// # Errors
    ///
    /// [`SearchError::CheckpointWrite`] on I/O failure.
    fn save(&self, path: &Path) -> Result<(), SearchError>;
}

/// Always the same tactic.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy {
    tactic: TacticKind,
}

impl FixedPolicy {
    #[must_use]
    pub fn new(tactic: TacticKind) -> Self {
        Self { tactic }
    }
}

impl ControlPolicy for FixedPolicy {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn arms(&self) -> usize {
        1
    }

    fn choose(&mut self, _context: usize, _ctx: &ControlContext, _rng: &mut SearchRng) -> Choice {
        Choice {
            arm: 0,
            directive: Directive::Tactic(self.tactic),
        }
    }

    fn load(&mut self, _path: &Path) -> bool {
        false
    }

    fn save(&self, _path: &Path) -> Result<(), SearchError> {
        Ok(())
    }
}

/// Reward of one control period: how much the best heuristic value dropped.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn reward(previous_best: i64, current_best: i64) -> f64 {
    previous_best.saturating_sub(current_best).max(0) as f64
}

#[derive(Debug, Clone, Copy)]
struct Period {
    started: Instant,
    expanded: u64,
    best_h: Option<i64>,
}

/// Periodic tactic selection, reward tracking and checkpointing.
#[derive(Debug)]
pub struct Controller {
    policy: Box<dyn ControlPolicy>,
    interval: ActionInterval,
    window: usize,
    rewards: VecDeque<f64>,
    usage: Vec<Vec<u64>>,
    current: Option<(usize, usize)>,
    period: Option<Period>,
    periods: u64,
    weights_path: Option<PathBuf>,
}

impl Controller {
    /// Build the policy named by the configuration and load its checkpoint.
    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        let settings = config.controller_settings;
        let (policy, weights_path): (Box<dyn ControlPolicy>, Option<PathBuf>) =
            match config.controller {
                ControllerKind::Fixed { tactic } => (
                    Box::new(FixedPolicy::new(tactic)),
                    config.checkpoint_path.clone(),
                ),
                ControllerKind::Bandit => (
                    Box::new(BanditPolicy::new(settings.exploration, settings.smoothing)),
                    config.checkpoint_path.clone(),
                ),
                ControllerKind::Softmax => (
                    Box::new(SoftmaxPolicy::new(settings.learning_rate)),
                    config.checkpoint_path.clone(),
                ),
                ControllerKind::Network => (
                    Box::new(NetworkPolicy::new(config.knobs)),
                    config.checkpoint_path.clone(),
                ),
                ControllerKind::Parameters => (
                    Box::new(ParametersPolicy::new(config.knobs)),
                    config.params_path.clone(),
                ),
            };
        Self::new(policy, config.action_interval, settings.reward_window, weights_path)
    }

    /// Wrap `policy`, loading weights and usage counts from `weights_path`
    /// when given.
    #[must_use]
    pub fn new(
        mut policy: Box<dyn ControlPolicy>,
        interval: ActionInterval,
        window: usize,
        weights_path: Option<PathBuf>,
    ) -> Self {
        let (contexts, arms) = (policy.contexts(), policy.arms());
        let mut usage = vec![vec![0; arms]; contexts];
        if let Some(path) = &weights_path {
            let loaded = policy.load(path);
            debug!(event = "checkpoint_load", policy = policy.name(), path = %path.display(), loaded);
            if let Some(prior) = checkpoint::load_usage(&checkpoint::usage_path(path), contexts, arms) {
                usage = prior;
            }
        }
        Self {
            policy,
            interval,
            window: window.max(1),
            rewards: VecDeque::new(),
            usage,
            current: None,
            period: None,
            periods: 0,
            weights_path,
        }
    }

    #[must_use]
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Usage counts, one row per context, one column per arm.
    #[must_use]
    pub fn usage(&self) -> &[Vec<u64>] {
        &self.usage
    }

    /// Most recent rewards, oldest first.
    #[must_use]
    pub fn recent_rewards(&self) -> Vec<f64> {
        self.rewards.iter().copied().collect()
    }

    /// Completed control periods.
    #[must_use]
    pub fn periods(&self) -> u64 {
        self.periods
    }

    /// Whether the current period has run its course.
    #[must_use]
    pub fn is_due(&self, expanded: u64) -> bool {
        let Some(period) = self.period else {
            return true;
        };
        match self.interval {
            ActionInterval::Expansions(n) => expanded.saturating_sub(period.expanded) >= n,
            ActionInterval::Millis(ms) => period.started.elapsed() >= Duration::from_millis(ms),
        }
    }

    /// Close the running period (if any), learn from its reward and choose
    /// the directive for the next one.
    pub fn control(&mut self, ctx: &ControlContext, rng: &mut SearchRng) -> Directive {
        if let (Some(period), Some((context, arm))) = (self.period, self.current) {
            let gained = match (period.best_h, ctx.best_h) {
                (Some(previous), Some(current)) => reward(previous, current),
                _ => 0.0,
            };
            self.policy.learn(context, arm, gained);
            if self.rewards.len() == self.window {
                self.rewards.pop_front();
            }
            self.rewards.push_back(gained);
            self.periods += 1;
            debug!(
                event = "control_update",
                policy = self.policy.name(),
                period = self.periods,
                context,
                arm,
                reward = gained
            );
        }

        let context = self.policy.context(ctx);
        let choice = self.policy.choose(context, ctx, rng);
        if let Some(count) = self
            .usage
            .get_mut(context)
            .and_then(|row| row.get_mut(choice.arm))
        {
            *count += 1;
        }
        self.current = Some((context, choice.arm));
        self.period = Some(Period {
            started: Instant::now(),
            expanded: ctx.statistics.expanded,
            best_h: ctx.best_h,
        });
        choice.directive
    }

    /// Persist weights and usage counts. A controller without a checkpoint
    /// path does nothing.
    ///
    /// # Errors
    ///
    /// [`SearchError::CheckpointWrite`] on I/O failure.
    pub fn save(&self) -> Result<(), SearchError> {
        let Some(path) = &self.weights_path else {
            return Ok(());
        };
        self.policy.save(path)?;
        checkpoint::save_rows(&checkpoint::usage_path(path), &self.usage)?;
        info!(event = "checkpoint_saved", policy = self.policy.name(), path = %path.display());
        Ok(())
    }
}

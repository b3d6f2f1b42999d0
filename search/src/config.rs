//! Search configuration.
//!
//! Every option is a constructor-time choice; nothing here changes while a
//! search runs except the [`SearchKnobs`] that the controller rewrites.
//! Configuration can be built in code (`SearchConfig::default().with_*`) or
//! loaded from TOML:
//!
//! ```
//! use pathwise_search::config::{ActionInterval, SearchConfig};
//!
//! let config = SearchConfig::from_toml_str(r#"
//!     seed = 7
//!     reopen_closed = true
//!     action_interval = { expansions = 50 }
//!
//!     [controller]
//!     type = "bandit"
//!
//!     [knobs]
//!     epsilon = 0.3
//!     rollout_length = 10
//! "#).unwrap();
//!
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.action_interval, ActionInterval::Expansions(50));
//! assert!((config.knobs.epsilon - 0.3).abs() < 1e-12);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::tactic::TacticKind;

/// Storage used for every frontier instance of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrontierKind {
    /// Ordered map of integer priority to FIFO bucket.
    Bucket,
    /// Binary min-heap with O(1) uniform random pick.
    #[default]
    Heap,
}

/// When the controller re-scores and re-chooses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionInterval {
    /// After this many expansions since the last choice.
    Expansions(u64),
    /// After this much wall-clock time since the last choice.
    Millis(u64),
}

impl Default for ActionInterval {
    fn default() -> Self {
        Self::Expansions(100)
    }
}

impl ActionInterval {
    #[must_use]
    pub fn as_duration(self) -> Option<Duration> {
        match self {
            Self::Millis(ms) => Some(Duration::from_millis(ms)),
            Self::Expansions(_) => None,
        }
    }
}

/// Which control policy drives tactic selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerKind {
    /// Always run one tactic.
    Fixed { tactic: TacticKind },
    /// Tabular epsilon-greedy bandit over tactics.
    Bandit,
    /// Contextual soft-max policy over tactics.
    Softmax,
    /// Feed-forward network producing continuous knobs.
    Network,
    /// Static knobs read from the parameters file.
    Parameters,
}

impl Default for ControllerKind {
    fn default() -> Self {
        Self::Fixed {
            tactic: TacticKind::BestFirst,
        }
    }
}

/// Continuous knobs shared by the tactics.
///
/// The parametrized tactic reads all of them; the discrete tactics read the
/// subset they need. The network controller rewrites them every period.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchKnobs {
    /// Probability of a uniform random removal instead of `remove_min`.
    pub epsilon: f64,
    /// Rollouts start once the stall counter exceeds this.
    pub stall_size: u32,
    /// Rollouts attempted per stalled expansion.
    pub rollout_count: u32,
    /// Maximum steps per rollout.
    pub rollout_length: u32,
    /// Expansions per global/local frontier cycle.
    pub cycle_length: u32,
    /// Share of a cycle spent on the local frontier.
    pub local_fraction: f64,
    /// Step budget of one locally-restricted search episode.
    pub local_step_limit: u32,
}

impl Default for SearchKnobs {
    fn default() -> Self {
        Self {
            epsilon: 0.2,
            stall_size: 5,
            rollout_count: 1,
            rollout_length: 20,
            cycle_length: 200,
            local_fraction: 0.0,
            local_step_limit: 100,
        }
    }
}

impl SearchKnobs {
    /// Expansions on the global frontier per cycle.
    #[must_use]
    pub fn global_limit(&self) -> u32 {
        self.cycle_length - self.local_limit()
    }

    /// Expansions on the local frontier per cycle.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn local_limit(&self) -> u32 {
        let local = (f64::from(self.cycle_length) * self.local_fraction.clamp(0.0, 1.0)).round();
        (local as u32).min(self.cycle_length)
    }

    /// Check the probability-valued knobs.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidConfig`] naming the out-of-range knob.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(SearchError::invalid(format!(
                "knobs.epsilon must be in [0, 1], got {}",
                self.epsilon
            )));
        }
        if !(0.0..=1.0).contains(&self.local_fraction) {
            return Err(SearchError::invalid(format!(
                "knobs.local_fraction must be in [0, 1], got {}",
                self.local_fraction
            )));
        }
        Ok(())
    }
}

/// Learning-rate style settings of the adaptive controllers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Exploration probability of the tabular bandit.
    pub exploration: f64,
    /// Exponential smoothing factor of the bandit estimates.
    pub smoothing: f64,
    /// Step size of the soft-max policy update.
    pub learning_rate: f64,
    /// Number of recent rewards kept for reporting and the context.
    pub reward_window: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            exploration: 0.1,
            smoothing: 0.1,
            learning_rate: 0.02,
            reward_window: 8,
        }
    }
}

/// Complete configuration of one search run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Seed of the single random generator owned by the run.
    pub seed: u64,
    /// Reopen closed nodes when a cheaper path is found.
    pub reopen_closed: bool,
    /// Counter bonus granted to preferred-only sub-frontiers per boost.
    pub boost: i64,
    pub frontier: FrontierKind,
    pub knobs: SearchKnobs,
    pub action_interval: ActionInterval,
    /// Reference time budget; the context bit "time half consumed" flips at half of it.
    pub time_budget_ms: u64,
    pub controller: ControllerKind,
    pub controller_settings: ControllerSettings,
    /// Controller weights checkpoint (loaded at start, written on success).
    pub checkpoint_path: Option<PathBuf>,
    /// Parameter list for the `parameters` controller.
    pub params_path: Option<PathBuf>,
    /// Driver-level expansion budget for [`crate::engine::SearchEngine::run`].
    pub max_expansions: Option<u64>,
    /// Keep the sequence of expanded states (tests and reports).
    pub record_expansions: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            reopen_closed: false,
            boost: 1000,
            frontier: FrontierKind::default(),
            knobs: SearchKnobs::default(),
            action_interval: ActionInterval::default(),
            time_budget_ms: 1000,
            controller: ControllerKind::default(),
            controller_settings: ControllerSettings::default(),
            checkpoint_path: None,
            params_path: None,
            max_expansions: None,
            record_expansions: false,
        }
    }
}

impl SearchConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ConfigIo`] if the file cannot be read and
    /// [`SearchError::ConfigParse`] if it is not valid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SearchError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SearchError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ConfigParse`] on malformed input.
    pub fn from_toml_str(s: &str) -> Result<Self, SearchError> {
        Ok(toml::from_str(s)?)
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_reopen_closed(mut self, reopen: bool) -> Self {
        self.reopen_closed = reopen;
        self
    }

    #[must_use]
    pub fn with_frontier(mut self, frontier: FrontierKind) -> Self {
        self.frontier = frontier;
        self
    }

    #[must_use]
    pub fn with_controller(mut self, controller: ControllerKind) -> Self {
        self.controller = controller;
        self
    }

    /// Shorthand for a fixed-tactic controller.
    #[must_use]
    pub fn with_tactic(self, tactic: TacticKind) -> Self {
        self.with_controller(ControllerKind::Fixed { tactic })
    }

    #[must_use]
    pub fn with_knobs(mut self, knobs: SearchKnobs) -> Self {
        self.knobs = knobs;
        self
    }

    #[must_use]
    pub fn with_action_interval(mut self, interval: ActionInterval) -> Self {
        self.action_interval = interval;
        self
    }

    #[must_use]
    pub fn with_boost(mut self, boost: i64) -> Self {
        self.boost = boost;
        self
    }

    #[must_use]
    pub fn with_checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_params_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.params_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_max_expansions(mut self, max: u64) -> Self {
        self.max_expansions = Some(max);
        self
    }

    #[must_use]
    pub fn with_record_expansions(mut self, record: bool) -> Self {
        self.record_expansions = record;
        self
    }

    /// Validate value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), SearchError> {
        self.knobs.validate()?;
        match self.action_interval {
            ActionInterval::Expansions(0) | ActionInterval::Millis(0) => {
                return Err(SearchError::invalid("action_interval must be non-zero"));
            }
            ActionInterval::Expansions(_) | ActionInterval::Millis(_) => {}
        }
        let settings = &self.controller_settings;
        if !(0.0..=1.0).contains(&settings.exploration) {
            return Err(SearchError::invalid(format!(
                "controller_settings.exploration must be in [0, 1], got {}",
                settings.exploration
            )));
        }
        if !(settings.smoothing > 0.0 && settings.smoothing <= 1.0) {
            return Err(SearchError::invalid(format!(
                "controller_settings.smoothing must be in (0, 1], got {}",
                settings.smoothing
            )));
        }
        if !settings.learning_rate.is_finite() || settings.learning_rate < 0.0 {
            return Err(SearchError::invalid(format!(
                "controller_settings.learning_rate must be finite and non-negative, got {}",
                settings.learning_rate
            )));
        }
        if settings.reward_window == 0 {
            return Err(SearchError::invalid(
                "controller_settings.reward_window must be at least 1",
            ));
        }
        if self.boost < 0 {
            return Err(SearchError::invalid(format!(
                "boost must be non-negative, got {}",
                self.boost
            )));
        }
        Ok(())
    }
}

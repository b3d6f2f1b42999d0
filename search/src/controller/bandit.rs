use std::path::Path;

use rand::Rng;

use super::{Choice, ControlContext, ControlPolicy, Directive};
use crate::checkpoint;
use crate::error::SearchError;
use crate::tactic::TacticKind;
use crate::SearchRng;

/// Tabular epsilon-greedy bandit over the discrete tactics.
///
/// Each arm keeps a success estimate smoothed towards `1` when its period
/// earned a positive reward and towards `0` otherwise. Ties go to the lowest
/// arm index.
#[derive(Debug, Clone)]
pub struct BanditPolicy {
    exploration: f64,
    smoothing: f64,
    estimates: Vec<f64>,
}

impl BanditPolicy {
    #[must_use]
    pub fn new(exploration: f64, smoothing: f64) -> Self {
        Self {
            exploration,
            smoothing,
            estimates: vec![0.0; TacticKind::DISCRETE.len()],
        }
    }

    #[must_use]
    pub fn estimates(&self) -> &[f64] {
        &self.estimates
    }

    fn greedy_arm(&self) -> usize {
        let mut best = 0;
        for (arm, value) in self.estimates.iter().enumerate() {
            if *value > self.estimates[best] {
                best = arm;
            }
        }
        best
    }
}

impl ControlPolicy for BanditPolicy {
    fn name(&self) -> &'static str {
        "bandit"
    }

    fn arms(&self) -> usize {
        TacticKind::DISCRETE.len()
    }

    fn choose(&mut self, _context: usize, _ctx: &ControlContext, rng: &mut SearchRng) -> Choice {
        let arm = if rng.random::<f64>() < self.exploration {
            rng.random_range(0..self.arms())
        } else {
            self.greedy_arm()
        };
        Choice {
            arm,
            directive: Directive::Tactic(TacticKind::DISCRETE[arm]),
        }
    }

    fn learn(&mut self, _context: usize, arm: usize, reward: f64) {
        let Some(estimate) = self.estimates.get_mut(arm) else {
            return;
        };
        let target = if reward > 0.0 { 1.0 } else { 0.0 };
        *estimate = (1.0 - self.smoothing) * *estimate + self.smoothing * target;
    }

    fn load(&mut self, path: &Path) -> bool {
        match checkpoint::load_floats_exact(path, self.arms()) {
            Some(values) => {
                self.estimates = values;
                true
            }
            None => false,
        }
    }

    fn save(&self, path: &Path) -> Result<(), SearchError> {
        checkpoint::save_rows(path, &[self.estimates.clone()])
    }
}

use std::path::Path;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;

use super::{Choice, ControlContext, ControlPolicy, Directive};
use crate::checkpoint;
use crate::error::SearchError;
use crate::tactic::TacticKind;
use crate::SearchRng;

/// Contexts: bit 0 is "best h below half the initial h", bit 1 is "more than
/// half of the time budget spent".
pub const CONTEXTS: usize = 4;

/// Soft-max policy gradient over the discrete tactics, one weight row per
/// context.
#[derive(Debug, Clone)]
pub struct SoftmaxPolicy {
    learning_rate: f64,
    weights: Vec<Vec<f64>>,
}

impl SoftmaxPolicy {
    #[must_use]
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            weights: vec![vec![0.0; TacticKind::DISCRETE.len()]; CONTEXTS],
        }
    }

    #[must_use]
    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    /// Action probabilities in `context`.
    #[must_use]
    pub fn probabilities(&self, context: usize) -> Vec<f64> {
        let row = &self.weights[context.min(CONTEXTS - 1)];
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = row.iter().map(|w| (w - max).exp()).collect();
        let total: f64 = exp.iter().sum();
        exp.into_iter().map(|e| e / total).collect()
    }
}

impl ControlPolicy for SoftmaxPolicy {
    fn name(&self) -> &'static str {
        "softmax"
    }

    fn arms(&self) -> usize {
        TacticKind::DISCRETE.len()
    }

    fn contexts(&self) -> usize {
        CONTEXTS
    }

    #[allow(clippy::cast_precision_loss)]
    fn context(&self, ctx: &ControlContext) -> usize {
        let halved = match (ctx.initial_h, ctx.best_h) {
            (Some(initial), Some(best)) => (best as f64) < initial as f64 / 2.0,
            _ => false,
        };
        let late = ctx.elapsed > ctx.time_budget / 2;
        usize::from(halved) | (usize::from(late) << 1)
    }

    fn choose(&mut self, context: usize, _ctx: &ControlContext, rng: &mut SearchRng) -> Choice {
        let arm = WeightedIndex::new(self.probabilities(context))
            .map(|dist| dist.sample(rng))
            .unwrap_or(0);
        Choice {
            arm,
            directive: Directive::Tactic(TacticKind::DISCRETE[arm]),
        }
    }

    fn learn(&mut self, context: usize, arm: usize, reward: f64) {
        let context = context.min(CONTEXTS - 1);
        let probabilities = self.probabilities(context);
        for (j, (weight, pi)) in self.weights[context]
            .iter_mut()
            .zip(probabilities)
            .enumerate()
        {
            let indicator = if j == arm { 1.0 } else { 0.0 };
            *weight += self.learning_rate * reward * (indicator - pi);
        }
    }

    fn load(&mut self, path: &Path) -> bool {
        let arms = self.arms();
        match checkpoint::load_floats_exact(path, CONTEXTS * arms) {
            Some(values) => {
                self.weights = values.chunks(arms).map(<[f64]>::to_vec).collect();
                true
            }
            None => false,
        }
    }

    fn save(&self, path: &Path) -> Result<(), SearchError> {
        checkpoint::save_rows(path, &self.weights)
    }
}

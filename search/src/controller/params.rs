use std::path::Path;

use super::{Choice, ControlContext, ControlPolicy, Directive};
use crate::checkpoint;
use crate::config::SearchKnobs;
use crate::error::SearchError;
use crate::SearchRng;

/// Number of values in a parameters file, in order: epsilon, stall size,
/// rollout count, rollout length, cycle length, local fraction.
pub const PARAMETERS: usize = 6;

/// Knobs read once from a parameters file and emitted every period.
#[derive(Debug, Clone, Copy)]
pub struct ParametersPolicy {
    knobs: SearchKnobs,
}

impl ParametersPolicy {
    #[must_use]
    pub fn new(knobs: SearchKnobs) -> Self {
        Self { knobs }
    }

    #[must_use]
    pub fn knobs(&self) -> SearchKnobs {
        self.knobs
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(v: f64) -> Option<u32> {
    (v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX)).then_some(v as u32)
}

fn knobs_from_values(values: &[f64], base: SearchKnobs) -> Option<SearchKnobs> {
    let [epsilon, stall, rollouts, length, cycle, local] = *values else {
        return None;
    };
    let knobs = SearchKnobs {
        epsilon,
        stall_size: count(stall)?,
        rollout_count: count(rollouts)?,
        rollout_length: count(length)?,
        cycle_length: count(cycle)?,
        local_fraction: local,
        local_step_limit: base.local_step_limit,
    };
    knobs.validate().ok().map(|()| knobs)
}

impl ControlPolicy for ParametersPolicy {
    fn name(&self) -> &'static str {
        "parameters"
    }

    fn arms(&self) -> usize {
        1
    }

    fn choose(&mut self, _context: usize, _ctx: &ControlContext, _rng: &mut SearchRng) -> Choice {
        Choice {
            arm: 0,
            directive: Directive::Knobs(self.knobs),
        }
    }

    fn load(&mut self, path: &Path) -> bool {
        let Some(knobs) = checkpoint::load_floats_exact(path, PARAMETERS)
            .and_then(|values| knobs_from_values(&values, self.knobs))
        else {
            return false;
        };
        self.knobs = knobs;
        true
    }

    fn save(&self, path: &Path) -> Result<(), SearchError> {
        let k = &self.knobs;
        checkpoint::save_rows(
            path,
            &[vec![
                k.epsilon,
                f64::from(k.stall_size),
                f64::from(k.rollout_count),
                f64::from(k.rollout_length),
                f64::from(k.cycle_length),
                k.local_fraction,
            ]],
        )
    }
}

use std::path::Path;

use super::{Choice, ControlContext, ControlPolicy, Directive};
use crate::checkpoint;
use crate::config::SearchKnobs;
use crate::error::SearchError;
use crate::SearchRng;

/// Inputs: initial h, best h, elapsed seconds, expansions without progress,
/// generated, evaluated, expanded.
pub const INPUTS: usize = 7;
/// Outputs: epsilon, stall size, rollout count, rollout length, cycle length,
/// local fraction.
pub const OUTPUTS: usize = 6;

/// Divisors applied to the raw inputs before the forward pass.
pub const FEATURE_SCALES: [f64; INPUTS] = [100.0, 100.0, 10.0, 1000.0, 1e5, 1e5, 1e5];

#[derive(Debug, Clone, PartialEq)]
struct Layer {
    rows: usize,
    cols: usize,
    /// Row-major `rows x cols`.
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl Layer {
    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .chunks(self.cols)
            .zip(&self.biases)
            .map(|(row, bias)| row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + bias)
            .collect()
    }
}

struct Cursor<'a> {
    rest: &'a [f64],
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [f64]> {
        if self.rest.len() < n {
            return None;
        }
        let (head, tail) = self.rest.split_at(n);
        self.rest = tail;
        Some(head)
    }
}

/// Dense feed-forward network, ReLU on hidden layers, linear output.
///
/// File layout (whitespace-separated): the layer count, then for each layer
/// its `rows cols`, its weights row by row and its biases.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedForward {
    layers: Vec<Layer>,
}

impl FeedForward {
    /// Parse the flat file layout. Returns `None` on any size mismatch,
    /// trailing values, or a shape other than `INPUTS -> .. -> OUTPUTS`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn parse(values: &[f64]) -> Option<Self> {
        fn count(v: f64) -> Option<usize> {
            (v >= 0.0 && v.fract() == 0.0).then_some(v as usize)
        }

        let mut cursor = Cursor { rest: values };
        let n_layers = count(cursor.take(1)?[0])?;
        if n_layers == 0 {
            return None;
        }
        let mut layers = Vec::with_capacity(n_layers);
        let mut width = INPUTS;
        for _ in 0..n_layers {
            let shape = cursor.take(2)?;
            let (rows, cols) = (count(shape[0])?, count(shape[1])?);
            if cols != width || rows == 0 {
                return None;
            }
            let weights = cursor.take(rows * cols)?.to_vec();
            let biases = cursor.take(rows)?.to_vec();
            layers.push(Layer {
                rows,
                cols,
                weights,
                biases,
            });
            width = rows;
        }
        if width != OUTPUTS || !cursor.rest.is_empty() {
            return None;
        }
        Some(Self { layers })
    }

    /// Load from disk, or `None` when missing or malformed.
    #[must_use]
    pub fn load(path: &Path) -> Option<Self> {
        Self::parse(&checkpoint::load_floats(path)?)
    }

    /// Rows in file layout, suitable for [`checkpoint::save_rows`].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        let mut rows = vec![vec![self.layers.len() as f64]];
        for layer in &self.layers {
            rows.push(vec![layer.rows as f64, layer.cols as f64]);
            rows.extend(layer.weights.chunks(layer.cols).map(<[f64]>::to_vec));
            rows.push(layer.biases.clone());
        }
        rows
    }

    #[must_use]
    pub fn forward(&self, input: &[f64]) -> Vec<f64> {
        let last = self.layers.len().saturating_sub(1);
        let mut activation = input.to_vec();
        for (i, layer) in self.layers.iter().enumerate() {
            activation = layer.forward(&activation);
            if i < last {
                activation.iter_mut().for_each(|a| *a = a.max(0.0));
            }
        }
        activation
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_count(x: f64, scale: f64) -> u32 {
    (x.max(0.0) * scale).round() as u32
}

/// Normalized network input for a control context.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn features(ctx: &ControlContext) -> [f64; INPUTS] {
    let raw = [
        ctx.initial_h.unwrap_or(0) as f64,
        ctx.best_h.unwrap_or(0) as f64,
        ctx.elapsed.as_secs_f64(),
        ctx.expansions_without_progress as f64,
        ctx.statistics.generated as f64,
        ctx.statistics.evaluated as f64,
        ctx.statistics.expanded as f64,
    ];
    let mut out = [0.0; INPUTS];
    for ((o, r), s) in out.iter_mut().zip(raw).zip(FEATURE_SCALES) {
        *o = r / s;
    }
    out
}

/// Map raw network outputs onto knobs. `local_step_limit` is not learned and
/// comes from `base`.
#[must_use]
pub fn knobs_from_outputs(outputs: &[f64], base: &SearchKnobs) -> SearchKnobs {
    let at = |i: usize| outputs.get(i).copied().unwrap_or(0.0);
    SearchKnobs {
        epsilon: sigmoid(at(0)),
        stall_size: scaled_count(at(1), 50.0),
        rollout_count: scaled_count(at(2), 10.0),
        rollout_length: scaled_count(at(3), 100.0),
        cycle_length: scaled_count(at(4), 1000.0).max(1),
        local_fraction: sigmoid(at(5)),
        local_step_limit: base.local_step_limit,
    }
}

/// Feed-forward network from run statistics to parametrized-tactic knobs.
///
/// Without a loaded network the configured knobs are emitted unchanged.
#[derive(Debug, Clone)]
pub struct NetworkPolicy {
    base: SearchKnobs,
    network: Option<FeedForward>,
}

impl NetworkPolicy {
    #[must_use]
    pub fn new(base: SearchKnobs) -> Self {
        Self {
            base,
            network: None,
        }
    }

    #[must_use]
    pub fn with_network(mut self, network: FeedForward) -> Self {
        self.network = Some(network);
        self
    }

    #[must_use]
    pub fn network(&self) -> Option<&FeedForward> {
        self.network.as_ref()
    }
}

impl ControlPolicy for NetworkPolicy {
    fn name(&self) -> &'static str {
        "network"
    }

    fn arms(&self) -> usize {
        1
    }

    fn choose(&mut self, _context: usize, ctx: &ControlContext, _rng: &mut SearchRng) -> Choice {
        let knobs = match &self.network {
            Some(network) => knobs_from_outputs(&network.forward(&features(ctx)), &self.base),
            None => self.base,
        };
        Choice {
            arm: 0,
            directive: Directive::Knobs(knobs),
        }
    }

    fn load(&mut self, path: &Path) -> bool {
        self.network = FeedForward::load(path);
        self.network.is_some()
    }

    fn save(&self, path: &Path) -> Result<(), SearchError> {
        match &self.network {
            Some(network) => checkpoint::save_rows(path, &network.to_rows()),
            None => Ok(()),
        }
    }
}

//! Feature encoding and the linear evaluator.

use std::fs;
use std::path::Path;

use pathwise_kernel::{OperatorId, StateHandle};

use super::{EvaluationResult, Evaluator};
use crate::checkpoint::parse_floats;
use crate::error::SearchError;

/// Turns a state into the fixed-length feature vector a learned model consumes.
pub trait FeatureEncoder {
    /// Length of every vector returned by [`FeatureEncoder::encode`].
    fn n_features(&self) -> usize;

    /// Encode `state`. `None` means the encoder already knows the state is a
    /// dead end (for example an infinite relaxed estimate).
    fn encode(&mut self, state: StateHandle) -> Option<Vec<f64>>;

    /// Preferred operators the encoder computed along the way.
    fn preferred_operators(&mut self, _state: StateHandle) -> Vec<OperatorId> {
        Vec::new()
    }
}

/// `intercept + w · x`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub weights: Vec<f64>,
}

impl LinearModel {
    #[must_use]
    pub fn new(intercept: f64, weights: Vec<f64>) -> Self {
        Self { intercept, weights }
    }

    /// Load a model file: whitespace-separated `intercept w1 … wn`.
    ///
    /// # Errors
    ///
    /// [`SearchError::Model`] if the file is unreadable, empty or contains
    /// a non-numeric token.
    pub fn load(path: &Path) -> Result<Self, SearchError> {
        let model_error = |detail: String| SearchError::Model {
            path: path.to_path_buf(),
            detail,
        };
        let text = fs::read_to_string(path).map_err(|e| model_error(e.to_string()))?;
        let values =
            parse_floats(&text).ok_or_else(|| model_error("non-numeric token".to_string()))?;
        let (intercept, weights) = values
            .split_first()
            .ok_or_else(|| model_error("empty model".to_string()))?;
        Ok(Self::new(*intercept, weights.to_vec()))
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// # Errors
    ///
    /// [`SearchError::FeatureArity`] when `features` has the wrong length.
    pub fn predict(&self, features: &[f64]) -> Result<f64, SearchError> {
        if features.len() != self.weights.len() {
            return Err(SearchError::FeatureArity {
                expected: self.weights.len(),
                actual: features.len(),
            });
        }
        Ok(self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>())
    }
}

/// In-process evaluator applying a [`LinearModel`] to encoded features.
#[derive(Debug)]
pub struct LinearEvaluator<E> {
    model: LinearModel,
    encoder: E,
}

impl<E: FeatureEncoder> LinearEvaluator<E> {
    /// # Errors
    ///
    /// [`SearchError::FeatureArity`] when encoder and model disagree on the
    /// feature count.
    pub fn new(model: LinearModel, encoder: E) -> Result<Self, SearchError> {
        if model.n_features() != encoder.n_features() {
            return Err(SearchError::FeatureArity {
                expected: model.n_features(),
                actual: encoder.n_features(),
            });
        }
        Ok(Self { model, encoder })
    }
}

impl<E: FeatureEncoder> Evaluator for LinearEvaluator<E> {
    fn name(&self) -> &str {
        "linear"
    }

    fn evaluate(&mut self, state: StateHandle, _g: u64) -> Result<EvaluationResult, SearchError> {
        let Some(features) = self.encoder.encode(state) else {
            return Ok(EvaluationResult::dead_end());
        };
        let scalar = self.model.predict(&features)?;
        Ok(EvaluationResult::value(scalar).with_preferred(self.encoder.preferred_operators(state)))
    }

    /// A learned estimate is no proof of unsolvability.
    fn dead_ends_are_reliable(&self) -> bool {
        false
    }
}

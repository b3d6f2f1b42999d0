//! Frontier (open list) family with ordered, uniform-random and epsilon-mixed
//! removal.
//!
//! A state may sit in a frontier several times (once per insertion). Only the
//! most recent insertion is meaningful; stale copies are discarded by the
//! expansion loop when the node store shows the state already closed.
//!
//! # Variants
//!
//! - [`HeapFrontier`] -- binary min-heap over `(key, insertion id)`, O(log n)
//!   uniform pick via swap-to-top
//! - [`BucketFrontier`] -- ordered map of key to FIFO bucket
//! - [`AlternationFrontier`] -- round-robin by fairness counter over
//!   sub-frontiers, with preferred-operator boosting
//!
//! [`FrontierSet`] owns the global frontier and the optional local one.

mod alternation;
mod bucket;
mod heap;
mod set;

use std::fmt::Debug;

use pathwise_kernel::StateHandle;
use rand::Rng;

use crate::config::FrontierKind;
use crate::evaluator::Evaluation;
use crate::SearchRng;

pub use alternation::AlternationFrontier;
pub use bucket::BucketFrontier;
pub use heap::HeapFrontier;
pub use set::{ActiveFrontier, FrontierSet, FrontierShape};

/// One physical frontier slot.
///
/// `keys` holds one priority per priority evaluator (see
/// [`crate::evaluator::EvaluatorGateway`]); a simple frontier orders by
/// the key at its own index. `preferred` marks entries generated by a
/// preferred operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub handle: StateHandle,
    pub keys: Vec<i64>,
    pub preferred: bool,
}

impl FrontierEntry {
    #[must_use]
    pub fn new(handle: StateHandle, keys: Vec<i64>, preferred: bool) -> Self {
        Self {
            handle,
            keys,
            preferred,
        }
    }

    /// Priority at `index`, or `i64::MAX` when the entry has no such key.
    #[must_use]
    pub fn key(&self, index: usize) -> i64 {
        self.keys.get(index).copied().unwrap_or(i64::MAX)
    }
}

/// Contract shared by every frontier variant.
pub trait Frontier: Debug {
    /// Add an entry. Preferred-only frontiers silently drop non-preferred entries.
    fn insert(&mut self, entry: FrontierEntry);

    /// Remove the entry with the lowest key; equal keys leave in insertion order.
    fn remove_min(&mut self) -> Option<FrontierEntry>;

    /// Remove an entry chosen uniformly among those present.
    fn remove_random(&mut self, rng: &mut SearchRng) -> Option<FrontierEntry>;

    /// With probability `epsilon` behave as [`Frontier::remove_random`], else as
    /// [`Frontier::remove_min`].
    fn remove_epsilon(&mut self, epsilon: f64, rng: &mut SearchRng) -> Option<FrontierEntry> {
        if rng.random::<f64>() < epsilon {
            self.remove_random(rng)
        } else {
            self.remove_min()
        }
    }

    /// Physical entry count (stale copies included).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);

    /// Remove and return every entry, lowest key first.
    fn drain(&mut self) -> Vec<FrontierEntry> {
        let mut out = Vec::with_capacity(self.len());
        while let Some(entry) = self.remove_min() {
            out.push(entry);
        }
        out
    }

    /// Whether the bound evaluator(s) judge the evaluated state a dead end.
    fn is_dead_end(&self, evaluation: &Evaluation) -> bool;

    /// Whether some bound evaluator with reliable dead ends reports one.
    fn is_reliable_dead_end(&self, evaluation: &Evaluation) -> bool;

    /// Whether only preferred entries are ever admitted.
    fn only_contains_preferred(&self) -> bool {
        false
    }

    /// Bias future selection toward preferred-only sub-frontiers.
    fn boost_preferred(&mut self) {}
}

/// Build the frontier used for one run.
///
/// A single priority evaluator without preferred-operator evaluators yields a
/// plain frontier. Otherwise every priority evaluator gets a regular
/// sub-frontier plus, when preferred operators are available, a
/// preferred-only twin, all inside an [`AlternationFrontier`].
#[must_use]
pub fn build_frontier(
    kind: FrontierKind,
    priority_evaluators: usize,
    with_preferred: bool,
    boost: i64,
) -> Box<dyn Frontier> {
    if priority_evaluators <= 1 && !with_preferred {
        return simple(kind, 0, false);
    }
    let mut sublists = Vec::new();
    for index in 0..priority_evaluators.max(1) {
        sublists.push(simple(kind, index, false));
        if with_preferred {
            sublists.push(simple(kind, index, true));
        }
    }
    Box::new(AlternationFrontier::new(sublists, boost))
}

fn simple(kind: FrontierKind, key_index: usize, preferred_only: bool) -> Box<dyn Frontier> {
    match kind {
        FrontierKind::Heap => Box::new(HeapFrontier::new(key_index, preferred_only)),
        FrontierKind::Bucket => Box::new(BucketFrontier::new(key_index, preferred_only)),
    }
}

/// Dead-end rule of a simple frontier bound to evaluator `key_index`.
fn evaluator_dead_end(evaluation: &Evaluation, key_index: usize) -> bool {
    evaluation
        .results
        .get(key_index)
        .is_some_and(|r| r.dead_end)
}

fn evaluator_reliable_dead_end(evaluation: &Evaluation, key_index: usize) -> bool {
    evaluator_dead_end(evaluation, key_index)
        && evaluation.reliable.get(key_index).copied().unwrap_or(false)
}

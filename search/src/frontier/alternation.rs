//! Alternation over several sub-frontiers.
//!
//! Every insertion lands in every sub-frontier (preferred-only members filter
//! on their own). Each removal picks the non-empty sub-frontier with the lowest
//! fairness counter, lowest position on ties, and bumps its counter.

use super::{Frontier, FrontierEntry};
use crate::evaluator::Evaluation;
use crate::SearchRng;

#[derive(Debug)]
pub struct AlternationFrontier {
    sublists: Vec<Box<dyn Frontier>>,
    priorities: Vec<i64>,
    boost: i64,
}

impl AlternationFrontier {
    /// `boost` is subtracted from the counter of every preferred-only member
    /// on [`Frontier::boost_preferred`].
    #[must_use]
    pub fn new(sublists: Vec<Box<dyn Frontier>>, boost: i64) -> Self {
        let priorities = vec![0; sublists.len()];
        Self {
            sublists,
            priorities,
            boost,
        }
    }

    /// Current fairness counters, one per member.
    #[must_use]
    pub fn priorities(&self) -> &[i64] {
        &self.priorities
    }

    fn select(&mut self) -> Option<usize> {
        let best = self
            .sublists
            .iter()
            .enumerate()
            .filter(|(_, list)| !list.is_empty())
            .min_by_key(|(i, _)| (self.priorities[*i], *i))
            .map(|(i, _)| i)?;
        self.priorities[best] += 1;
        Some(best)
    }
}

impl Frontier for AlternationFrontier {
    fn insert(&mut self, entry: FrontierEntry) {
        for list in &mut self.sublists {
            list.insert(entry.clone());
        }
    }

    fn remove_min(&mut self) -> Option<FrontierEntry> {
        let best = self.select()?;
        self.sublists[best].remove_min()
    }

    fn remove_random(&mut self, rng: &mut SearchRng) -> Option<FrontierEntry> {
        let best = self.select()?;
        self.sublists[best].remove_random(rng)
    }

    fn remove_epsilon(&mut self, epsilon: f64, rng: &mut SearchRng) -> Option<FrontierEntry> {
        let best = self.select()?;
        self.sublists[best].remove_epsilon(epsilon, rng)
    }

    fn len(&self) -> usize {
        self.sublists.iter().map(|l| l.len()).sum()
    }

    fn clear(&mut self) {
        for list in &mut self.sublists {
            list.clear();
        }
    }

    fn drain(&mut self) -> Vec<FrontierEntry> {
        self.sublists.iter_mut().flat_map(|l| l.drain()).collect()
    }

    /// Dead if any member reports a reliable dead end, else only if every
    /// member agrees.
    fn is_dead_end(&self, evaluation: &Evaluation) -> bool {
        if self.is_reliable_dead_end(evaluation) {
            return true;
        }
        self.sublists.iter().all(|l| l.is_dead_end(evaluation))
    }

    fn is_reliable_dead_end(&self, evaluation: &Evaluation) -> bool {
        self.sublists
            .iter()
            .any(|l| l.is_reliable_dead_end(evaluation))
    }

    fn boost_preferred(&mut self) {
        for (list, priority) in self.sublists.iter().zip(self.priorities.iter_mut()) {
            if list.only_contains_preferred() {
                *priority -= self.boost;
            }
        }
    }
}

//! Bucket frontier: ordered map from key to a FIFO of entries.
//!
//! Uniform removal walks buckets in key order to the k-th entry, so it is
//! linear in the number of distinct keys.

use std::collections::{BTreeMap, VecDeque};

use rand::Rng;

use super::{evaluator_dead_end, evaluator_reliable_dead_end, Frontier, FrontierEntry};
use crate::evaluator::Evaluation;
use crate::SearchRng;

#[derive(Debug)]
pub struct BucketFrontier {
    buckets: BTreeMap<i64, VecDeque<FrontierEntry>>,
    size: usize,
    key_index: usize,
    preferred_only: bool,
}

impl BucketFrontier {
    #[must_use]
    pub fn new(key_index: usize, preferred_only: bool) -> Self {
        Self {
            buckets: BTreeMap::new(),
            size: 0,
            key_index,
            preferred_only,
        }
    }

    /// Number of distinct keys currently held.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl Frontier for BucketFrontier {
    fn insert(&mut self, entry: FrontierEntry) {
        if self.preferred_only && !entry.preferred {
            return;
        }
        let key = entry.key(self.key_index);
        self.buckets.entry(key).or_default().push_back(entry);
        self.size += 1;
    }

    fn remove_min(&mut self) -> Option<FrontierEntry> {
        let mut first = self.buckets.first_entry()?;
        let entry = first.get_mut().pop_front();
        if first.get().is_empty() {
            first.remove();
        }
        if entry.is_some() {
            self.size -= 1;
        }
        entry
    }

    fn remove_random(&mut self, rng: &mut SearchRng) -> Option<FrontierEntry> {
        if self.size == 0 {
            return None;
        }
        let mut k = rng.random_range(0..self.size);
        let mut hit = None;
        for (key, bucket) in &self.buckets {
            if k < bucket.len() {
                hit = Some(*key);
                break;
            }
            k -= bucket.len();
        }
        let key = hit?;
        let bucket = self.buckets.get_mut(&key)?;
        let entry = bucket.remove(k);
        if bucket.is_empty() {
            self.buckets.remove(&key);
        }
        if entry.is_some() {
            self.size -= 1;
        }
        entry
    }

    fn len(&self) -> usize {
        self.size
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.size = 0;
    }

    fn is_dead_end(&self, evaluation: &Evaluation) -> bool {
        evaluator_dead_end(evaluation, self.key_index)
    }

    fn is_reliable_dead_end(&self, evaluation: &Evaluation) -> bool {
        evaluator_reliable_dead_end(evaluation, self.key_index)
    }

    fn only_contains_preferred(&self) -> bool {
        self.preferred_only
    }
}

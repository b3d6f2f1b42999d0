//! Array-backed binary min-heap frontier.
//!
//! `std::collections::BinaryHeap` does not expose its slots, so the heap is
//! kept by hand: uniform removal needs to address an arbitrary slot.

use std::cmp::Ordering;

use rand::Rng;

use super::{evaluator_dead_end, evaluator_reliable_dead_end, Frontier, FrontierEntry};
use crate::evaluator::Evaluation;
use crate::SearchRng;

#[derive(Debug)]
struct Slot {
    key: i64,
    /// Insertion counter; breaks key ties FIFO.
    seq: u64,
    entry: FrontierEntry,
}

impl Slot {
    fn order(&self, other: &Self) -> Ordering {
        (self.key, self.seq).cmp(&(other.key, other.seq))
    }
}

/// Min-heap ordered by `(key, insertion sequence)`.
#[derive(Debug)]
pub struct HeapFrontier {
    slots: Vec<Slot>,
    next_seq: u64,
    key_index: usize,
    preferred_only: bool,
}

impl HeapFrontier {
    /// Heap ordered by the entry key at `key_index`.
    #[must_use]
    pub fn new(key_index: usize, preferred_only: bool) -> Self {
        Self {
            slots: Vec::new(),
            next_seq: 0,
            key_index,
            preferred_only,
        }
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.slots[pos].order(&self.slots[parent]) == Ordering::Less {
                self.slots.swap(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * pos + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut child = left;
            if right < len && self.slots[right].order(&self.slots[left]) == Ordering::Less {
                child = right;
            }
            if self.slots[child].order(&self.slots[pos]) == Ordering::Less {
                self.slots.swap(pos, child);
                pos = child;
            } else {
                break;
            }
        }
    }
}

impl Frontier for HeapFrontier {
    fn insert(&mut self, entry: FrontierEntry) {
        if self.preferred_only && !entry.preferred {
            return;
        }
        let slot = Slot {
            key: entry.key(self.key_index),
            seq: self.next_seq,
            entry,
        };
        self.next_seq += 1;
        self.slots.push(slot);
        let last = self.slots.len() - 1;
        self.sift_up(last);
    }

    fn remove_min(&mut self) -> Option<FrontierEntry> {
        if self.slots.is_empty() {
            return None;
        }
        let top = self.slots.swap_remove(0);
        if !self.slots.is_empty() {
            self.sift_down(0);
        }
        Some(top.entry)
    }

    fn remove_random(&mut self, rng: &mut SearchRng) -> Option<FrontierEntry> {
        if self.slots.is_empty() {
            return None;
        }
        // Force the chosen slot to the root, then pop it. Evaluator keys are
        // clamped well above i64::MIN so the forced slot wins every compare.
        let pos = rng.random_range(0..self.slots.len());
        self.slots[pos].key = i64::MIN;
        self.sift_up(pos);
        self.remove_min()
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn clear(&mut self) {
        self.slots.clear();
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

//! Frontier ordering and uniform-removal locks.
//!
//! - Repeated `remove_min` yields non-decreasing keys, FIFO within a key.
//! - `remove_random` picks each present entry with equal probability
//!   (chi-square over 5 entries x 5000 trials, fixed seed).
//! - `remove_epsilon` degenerates to `remove_min` at 0 and to uniform at 1.

use pathwise_kernel::StateHandle;
use pathwise_search::frontier::{
    build_frontier, BucketFrontier, Frontier, FrontierEntry, HeapFrontier,
};
use pathwise_search::{FrontierKind, SearchRng};
use rand::{Rng, SeedableRng};

fn variants() -> Vec<(&'static str, Box<dyn Frontier>)> {
    vec![
        ("heap", Box::new(HeapFrontier::new(0, false))),
        ("bucket", Box::new(BucketFrontier::new(0, false))),
    ]
}

fn entry(index: u32, key: i64) -> FrontierEntry {
    FrontierEntry::new(StateHandle::new(index), vec![key], false)
}

#[test]
fn remove_min_is_sorted_and_fifo_within_key() {
    for (name, mut frontier) in variants() {
        let mut rng = SearchRng::seed_from_u64(11);
        // handle index = insertion order
        let mut keys = Vec::new();
        for index in 0..500 {
            let key = rng.random_range(0..12);
            keys.push(key);
            frontier.insert(entry(index, key));
        }

        let drained = frontier.drain();
        assert_eq!(drained.len(), 500, "{name}");
        for pair in drained.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.key(0) <= b.key(0), "{name}: keys out of order");
            if a.key(0) == b.key(0) {
                assert!(
                    a.handle < b.handle,
                    "{name}: equal keys left out of insertion order"
                );
            }
        }
        assert!(frontier.is_empty(), "{name}");
    }
}

#[test]
fn interleaved_inserts_keep_the_order_contract() {
    for (name, mut frontier) in variants() {
        let mut rng = SearchRng::seed_from_u64(3);
        let mut next = 0;
        let mut last: Option<(i64, StateHandle)> = None;
        for _ in 0..200 {
            // inserts never go below the last removed key, as in best-first
            let floor = last.map_or(0, |(key, _)| key);
            for _ in 0..3 {
                frontier.insert(entry(next, floor + rng.random_range(0..5)));
                next += 1;
            }
            let removed = frontier.remove_min().unwrap();
            if let Some((key, handle)) = last {
                assert!(removed.key(0) >= key, "{name}");
                if removed.key(0) == key {
                    assert!(removed.handle > handle, "{name}");
                }
            }
            last = Some((removed.key(0), removed.handle));
        }
    }
}

#[test]
fn remove_random_is_uniform() {
    const ENTRIES: u32 = 5;
    const TRIALS: u32 = 5000;
    // chi-square, 4 degrees of freedom, p = 0.001
    const CRITICAL: f64 = 18.467;

    for (name, _) in variants() {
        let mut rng = SearchRng::seed_from_u64(2024);
        let mut counts = [0u32; ENTRIES as usize];
        for _ in 0..TRIALS {
            let mut frontier: Box<dyn Frontier> = if name == "heap" {
                Box::new(HeapFrontier::new(0, false))
            } else {
                Box::new(BucketFrontier::new(0, false))
            };
            for index in 0..ENTRIES {
                frontier.insert(entry(index, i64::from(index % 3)));
            }
            let picked = frontier.remove_random(&mut rng).unwrap();
            counts[picked.handle.index()] += 1;
            assert_eq!(frontier.len(), ENTRIES as usize - 1);
        }

        let expected = f64::from(TRIALS) / f64::from(ENTRIES);
        let chi_square: f64 = counts
            .iter()
            .map(|&c| (f64::from(c) - expected).powi(2) / expected)
            .sum();
        assert!(
            chi_square < CRITICAL,
            "{name}: chi-square {chi_square:.2} over {counts:?}"
        );
    }
}

#[test]
fn remove_random_drains_every_entry_once() {
    for (name, mut frontier) in variants() {
        let mut rng = SearchRng::seed_from_u64(8);
        for index in 0..50 {
            frontier.insert(entry(index, i64::from(index % 7)));
        }
        let mut seen: Vec<u32> = Vec::new();
        while let Some(e) = frontier.remove_random(&mut rng) {
            seen.push(u32::try_from(e.handle.index()).unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>(), "{name}");
    }
}

#[test]
fn epsilon_zero_is_remove_min() {
    for (name, mut frontier) in variants() {
        let mut rng = SearchRng::seed_from_u64(1);
        for (index, key) in [(0, 4), (1, 2), (2, 9), (3, 2)] {
            frontier.insert(entry(index, key));
        }
        let order: Vec<usize> = std::iter::from_fn(|| frontier.remove_epsilon(0.0, &mut rng))
            .map(|e| e.handle.index())
            .collect();
        assert_eq!(order, vec![1, 3, 0, 2], "{name}");
    }
}

#[test]
fn epsilon_one_reaches_non_minimal_entries() {
    for (name, mut frontier) in variants() {
        let mut rng = SearchRng::seed_from_u64(5);
        let mut first_picks = [0u32; 4];
        for _ in 0..400 {
            frontier.clear();
            for index in 0..4 {
                frontier.insert(entry(index, i64::from(index)));
            }
            let e = frontier.remove_epsilon(1.0, &mut rng).unwrap();
            first_picks[e.handle.index()] += 1;
        }
        assert!(first_picks.iter().all(|&c| c > 50), "{name}: {first_picks:?}");
    }
}

#[test]
fn single_evaluator_without_preferred_gets_a_plain_frontier() {
    for kind in [FrontierKind::Heap, FrontierKind::Bucket] {
        let mut frontier = build_frontier(kind, 1, false, 1000);
        for (index, key) in [(0, 3), (1, 1), (2, 2)] {
            frontier.insert(entry(index, key));
        }
        let order: Vec<usize> = frontier.drain().iter().map(|e| e.handle.index()).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }
}

#[test]
fn preferred_only_twin_drops_plain_entries() {
    let mut frontier = build_frontier(FrontierKind::Heap, 1, true, 1000);
    frontier.insert(entry(0, 5));
    frontier.insert(FrontierEntry::new(StateHandle::new(1), vec![7], true));
    // plain entry lands in one sub-frontier, preferred entry in both
    assert_eq!(frontier.len(), 3);
}

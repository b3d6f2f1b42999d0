//! Shared helpers for pathwise benchmark suites.

use pathwise_harness::worlds::GridWorld;
use pathwise_harness::SearchWorld;
use pathwise_kernel::StateHandle;
use pathwise_search::frontier::FrontierEntry;
use pathwise_search::{SearchConfig, SearchEngine, SearchOutcome, SearchRng};
use rand::{Rng, SeedableRng};

/// A named world the macro benches run every tactic on.
pub struct Regime {
    pub name: &'static str,
    pub world: GridWorld,
}

/// `width x height` grid whose walls force a back-and-forth walk: every
/// fourth column (offset 2) is a wall with one gap, alternating between the
/// bottom and the top row. Manhattan distance is badly misleading here.
///
/// # Panics
///
/// Panics on a degenerate size (the map would not parse).
#[must_use]
pub fn serpentine(width: usize, height: usize) -> GridWorld {
    let mut map = String::with_capacity((width + 1) * height);
    for y in 0..height {
        for x in 0..width {
            let gap = if (x / 4) % 2 == 0 { height - 1 } else { 0 };
            map.push(if (x, y) == (0, 0) {
                'S'
            } else if x + 1 == width && y + 1 == height {
                'G'
            } else if x % 4 == 2 && y != gap {
                '#'
            } else {
                '.'
            });
        }
        map.push('\n');
    }
    GridWorld::parse(&map).expect("serpentine map parses")
}

/// Benchmark regimes, cheapest first.
///
/// # Panics
///
/// Panics if a built-in map fails to parse.
#[must_use]
pub fn regimes() -> Vec<Regime> {
    vec![
        Regime {
            name: "open_field_30",
            world: GridWorld::open_field(30, 30).expect("open field parses"),
        },
        Regime {
            name: "serpentine_41x20",
            world: serpentine(41, 20),
        },
    ]
}

/// `n` single-key entries with keys drawn from `0..n/4` (many ties).
#[must_use]
pub fn frontier_entries(n: u32, seed: u64) -> Vec<FrontierEntry> {
    let mut rng = SearchRng::seed_from_u64(seed);
    let spread = i64::from((n / 4).max(1));
    (0..n)
        .map(|i| FrontierEntry::new(StateHandle::new(i), vec![rng.random_range(0..spread)], false))
        .collect()
}

/// Build an engine for `world` and run it to the end.
///
/// # Panics
///
/// Panics if the configuration is rejected. Benchmark setup failures are fatal.
#[must_use]
pub fn run_once(world: &GridWorld, config: &SearchConfig) -> SearchOutcome {
    SearchEngine::new(world, world.evaluators(), config)
        .expect("benchmark configuration is valid")
        .run()
}

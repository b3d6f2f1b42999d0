//! Phase boundaries of the parametrized tactic.
//!
//! - Local → global merges every local entry into the global frontier.
//! - Global → local restarts the local frontier from the single best global
//!   entry.

use lock_tests::graph_task::GraphTask;
use pathwise_harness::SearchWorld;
use pathwise_search::frontier::ActiveFrontier;
use pathwise_search::space::SearchSpace;
use pathwise_search::tactic::{Tactic, TacticKind, TacticStatus};
use pathwise_search::{SearchConfig, SearchKnobs};

/// ```text
/// S --> A --> D --> G
/// S --> B --> E --> G
/// S --> C
/// h: S=5 A=3 B=2 C=4 D=1 E=1 G=0
/// ```
fn fan() -> GraphTask {
    GraphTask::new(
        &["S", "A", "B", "C", "D", "E", "G"],
        &[
            ("S", "A", 1),
            ("S", "B", 1),
            ("S", "C", 1),
            ("A", "D", 1),
            ("B", "E", 1),
            ("D", "G", 1),
            ("E", "G", 1),
        ],
        "G",
        &[Some(5), Some(3), Some(2), Some(4), Some(1), Some(1), Some(0)],
    )
}

/// One expansion per phase, no randomness, no rollouts.
fn alternating() -> SearchKnobs {
    SearchKnobs {
        epsilon: 0.0,
        stall_size: 1000,
        rollout_count: 0,
        rollout_length: 0,
        cycle_length: 2,
        local_fraction: 0.5,
        local_step_limit: 10,
    }
}

#[test]
fn phases_merge_and_restart_the_local_frontier() {
    let task = fan();
    let config = SearchConfig::default().with_record_expansions(true);
    let mut space = SearchSpace::new(&task, task.evaluators(), &config);
    assert!(space.initialize().unwrap());
    let knobs = alternating();
    let mut tactic = Tactic::new(TacticKind::Parametrized);

    // global phase: S expanded, A B C go global
    assert_eq!(tactic.step(&mut space, &knobs).unwrap(), TacticStatus::InProgress);
    assert_eq!(space.frontiers().active(), ActiveFrontier::Global);
    assert_eq!(space.frontiers().global().len(), 3);
    assert_eq!(space.frontiers().local_len(), 0);

    // local phase: seeded with B alone, whose child E stays local
    assert_eq!(tactic.step(&mut space, &knobs).unwrap(), TacticStatus::InProgress);
    assert_eq!(space.frontiers().active(), ActiveFrontier::Local);
    assert_eq!(space.frontiers().global().len(), 2);
    assert_eq!(space.frontiers().local_len(), 1);

    // global phase: E merged back and expanded from the global frontier
    assert_eq!(tactic.step(&mut space, &knobs).unwrap(), TacticStatus::InProgress);
    assert_eq!(space.frontiers().active(), ActiveFrontier::Global);
    assert_eq!(space.frontiers().local_len(), 0);
    assert_eq!(space.frontiers().global().len(), 3);

    // next local phase restarts from the global best, which is the goal
    let status = tactic.step(&mut space, &knobs).unwrap();
    assert_eq!(status, TacticStatus::Solved(task.state("G")));
    assert_eq!(
        task.names(space.history().unwrap()),
        vec!["S", "B", "E", "G"]
    );
}

#[test]
fn teardown_after_a_local_phase_leaves_nothing_stranded() {
    let task = fan();
    let mut space = SearchSpace::new(&task, task.evaluators(), &SearchConfig::default());
    assert!(space.initialize().unwrap());
    let knobs = alternating();
    let mut tactic = Tactic::new(TacticKind::Parametrized);
    tactic.step(&mut space, &knobs).unwrap();
    tactic.step(&mut space, &knobs).unwrap();
    assert_eq!(space.frontiers().local_len(), 1);

    assert_eq!(tactic.teardown(&mut space), 1);
    assert_eq!(space.frontiers().active(), ActiveFrontier::Global);
    assert_eq!(space.frontiers().local_len(), 0);
    assert_eq!(space.frontiers().global().len(), 3);
}

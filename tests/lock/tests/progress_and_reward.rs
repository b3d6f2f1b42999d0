//! Stall counter and controller reward locks.
//!
//! - Successor values `[5, 5, 5, 3, 3]` drive `expansions_without_progress`
//!   through 1, 2, 3, 0, 1.
//! - Reward is the drop in best h over one control period: 10 → 6 gives 4,
//!   6 → 6 gives 0, never negative.

use std::time::Duration;

use lock_tests::graph_task::GraphTask;
use pathwise_harness::worlds::PlateauWorld;
use pathwise_harness::{run_search, SearchWorld};
use pathwise_search::controller::{reward, ControlContext, FixedPolicy};
use pathwise_search::frontier::ActiveFrontier;
use pathwise_search::space::{ExpandOutcome, Pick, SearchSpace};
use pathwise_search::{
    ActionInterval, Controller, ControllerKind, Directive, SearchConfig, SearchEngine, SearchRng,
    SearchStatistics, TacticKind,
};
use rand::SeedableRng;

#[test]
fn stall_counter_resets_exactly_on_a_new_minimum() {
    // s0 is evaluated at start; its successors carry 5, 5, 5, 3, 3
    let task = GraphTask::line(&[5, 5, 5, 5, 3, 3, 0]);
    let mut space = SearchSpace::new(&task, task.evaluators(), &SearchConfig::default());
    assert!(space.initialize().unwrap());
    assert_eq!(space.progress().expansions_without_progress(), 0);

    let mut counters = Vec::new();
    for _ in 0..5 {
        let entry = space.pop(ActiveFrontier::Global, Pick::Min).unwrap();
        let ExpandOutcome::Expanded(expanded) = space.expand(entry.handle).unwrap() else {
            panic!("goal reached early");
        };
        space.insert_all(ActiveFrontier::Global, expanded.children);
        counters.push(space.progress().expansions_without_progress());
    }

    assert_eq!(counters, vec![1, 2, 3, 0, 1]);
    assert_eq!(space.progress().best_h(), Some(3));
    assert_eq!(space.progress().initial_h(), Some(5));
}

#[test]
fn stalled_plateau_triggers_rollouts() {
    let world = PlateauWorld::new(16, 10, 2).unwrap();
    let mut knobs = pathwise_search::SearchKnobs::default();
    knobs.stall_size = 2;
    knobs.rollout_length = 6;
    let config = SearchConfig::default()
        .with_tactic(TacticKind::StochasticRollout)
        .with_knobs(knobs)
        .with_seed(4);
    let report = run_search(&world, &config).unwrap();
    assert!(report.is_solved());
    assert!(report.statistics.rollouts > 0);
}

#[test]
fn reward_is_the_drop_in_best_h() {
    assert!((reward(10, 6) - 4.0).abs() < f64::EPSILON);
    assert!(reward(6, 6).abs() < f64::EPSILON);
    assert!(reward(6, 9).abs() < f64::EPSILON);
}

fn context(best_h: i64, expanded: u64) -> ControlContext {
    ControlContext {
        initial_h: Some(12),
        best_h: Some(best_h),
        elapsed: Duration::from_millis(1),
        time_budget: Duration::from_secs(1),
        expansions_without_progress: 0,
        statistics: SearchStatistics {
            expanded,
            ..SearchStatistics::default()
        },
    }
}

#[test]
fn controller_records_one_reward_per_period() {
    let mut controller = Controller::new(
        Box::new(FixedPolicy::new(TacticKind::BestFirst)),
        ActionInterval::Expansions(10),
        4,
        None,
    );
    let mut rng = SearchRng::seed_from_u64(0);

    assert!(controller.is_due(0));
    let directive = controller.control(&context(10, 0), &mut rng);
    assert_eq!(directive, Directive::Tactic(TacticKind::BestFirst));
    assert!(controller.recent_rewards().is_empty());

    assert!(!controller.is_due(9));
    assert!(controller.is_due(10));
    controller.control(&context(6, 10), &mut rng);
    controller.control(&context(6, 20), &mut rng);

    assert_eq!(controller.recent_rewards(), vec![4.0, 0.0]);
    assert_eq!(controller.periods(), 2);
}

#[test]
fn adaptive_run_never_sees_a_negative_reward() {
    let world = PlateauWorld::new(20, 12, 3).unwrap();
    for controller in [ControllerKind::Bandit, ControllerKind::Softmax] {
        let config = SearchConfig::default()
            .with_controller(controller)
            .with_action_interval(ActionInterval::Expansions(3))
            .with_seed(13);
        let mut engine = SearchEngine::new(&world, world.evaluators(), &config).unwrap();
        let outcome = engine.run();
        assert!(outcome.is_solved(), "{controller:?}");
        assert!(engine.controller().periods() > 0);
        assert!(engine
            .controller()
            .recent_rewards()
            .iter()
            .all(|r| *r >= 0.0));
    }
}

//! End-to-end search locks.
//!
//! - `A → B → C → D` with best-first expands A, B, C, D and returns the plan
//!   `A→B, B→C, C→D` of cost 3.
//! - Every tactic, under every controller, solves the same maze.
//! - Budgets, dead roots and exhausted frontiers end in `Failed` without a
//!   plan.

use lock_tests::canonical_run;
use lock_tests::graph_task::GraphTask;
use pathwise_harness::worlds::{ChainWorld, GridWorld, PlateauWorld};
use pathwise_harness::{run_search, SearchWorld};
use pathwise_kernel::TransitionSystem;
use pathwise_search::{
    ControllerKind, FailureReason, FrontierKind, SearchConfig, SearchEngine, SearchStatus,
    TacticKind,
};

#[test]
fn chain_expands_in_order_and_returns_the_three_step_plan() {
    let world = ChainWorld::abcd();
    let config = SearchConfig::default()
        .with_tactic(TacticKind::BestFirst)
        .with_record_expansions(true);
    let mut engine = SearchEngine::new(&world, world.evaluators(), &config).unwrap();
    let outcome = engine.run();

    assert_eq!(outcome.status, SearchStatus::Solved);
    let order: Vec<&str> = engine
        .history()
        .unwrap()
        .iter()
        .map(|s| world.name(*s))
        .collect();
    assert_eq!(order, vec!["A", "B", "C", "D"]);

    let plan = outcome.plan.unwrap();
    let steps: Vec<String> = plan
        .operators()
        .iter()
        .map(|op| world.operator_name(*op))
        .collect();
    assert_eq!(steps, vec!["A->B", "B->C", "C->D"]);
    assert_eq!(plan.cost(), 3);
    assert_eq!(outcome.statistics.expanded, 4);
}

#[test]
fn chain_plan_is_the_same_for_both_frontier_kinds() {
    for frontier in [FrontierKind::Heap, FrontierKind::Bucket] {
        let report = run_search(
            &ChainWorld::abcd(),
            &SearchConfig::default().with_frontier(frontier),
        )
        .unwrap();
        assert_eq!(report.plan, vec!["A->B", "B->C", "C->D"], "{frontier:?}");
        assert_eq!(report.plan_cost, Some(3));
    }
}

#[test]
fn every_tactic_solves_the_maze() {
    let world = canonical_run::world();
    for tactic in TacticKind::DISCRETE
        .into_iter()
        .chain([TacticKind::Parametrized])
    {
        for seed in [1, 2] {
            let config = SearchConfig::default().with_tactic(tactic).with_seed(seed);
            let report = run_search(&world, &config).unwrap();
            assert!(report.is_solved(), "{tactic} (seed {seed}) failed");
            assert_eq!(report.path.first().map(String::as_str), Some("(0, 0)"));
            assert_eq!(report.path.last().map(String::as_str), Some("(9, 6)"));
            let used: Vec<&str> = report.tactic_usage.keys().map(String::as_str).collect();
            assert_eq!(used, vec![tactic.name()]);
        }
    }
}

#[test]
fn every_controller_solves_the_maze() {
    let world = canonical_run::world();
    for controller in [
        ControllerKind::Bandit,
        ControllerKind::Softmax,
        ControllerKind::Network,
        ControllerKind::Parameters,
    ] {
        let config = canonical_run::config().with_controller(controller);
        let report = run_search(&world, &config).unwrap();
        assert!(report.is_solved(), "{controller:?}");
        assert!(report.verify_digest());
    }
}

#[test]
fn knob_controllers_run_the_parametrized_tactic() {
    let world = PlateauWorld::new(14, 8, 2).unwrap();
    for controller in [ControllerKind::Network, ControllerKind::Parameters] {
        let config = SearchConfig::default().with_controller(controller);
        let mut engine = SearchEngine::new(&world, world.evaluators(), &config).unwrap();
        assert!(engine.run().is_solved());
        assert_eq!(engine.active_tactic(), Some(TacticKind::Parametrized));
        assert_eq!(
            engine.tactic_periods().keys().copied().collect::<Vec<_>>(),
            vec![TacticKind::Parametrized]
        );
    }
}

#[test]
fn open_field_plans_are_optimal_under_best_first() {
    let world = GridWorld::open_field(7, 5).unwrap();
    let report = run_search(&world, &SearchConfig::default()).unwrap();
    assert_eq!(report.plan_cost, Some(10));
    // Manhattan is perfect here: nothing off the plan is expanded
    assert_eq!(report.statistics.expanded, 11);
}

#[test]
fn expansion_budget_fails_without_a_plan() {
    let world = canonical_run::world();
    let config = SearchConfig::default().with_max_expansions(3);
    let mut engine = SearchEngine::new(&world, world.evaluators(), &config).unwrap();
    let outcome = engine.run();
    assert_eq!(
        outcome.status,
        SearchStatus::Failed(FailureReason::ExpansionBudget)
    );
    assert!(outcome.plan.is_none());
    assert_eq!(outcome.statistics.expanded, 3);
}

#[test]
fn dead_root_fails_immediately() {
    let task = GraphTask::new(&["S", "G"], &[("S", "G", 1)], "G", &[None, Some(0)]);
    let mut engine =
        SearchEngine::new(&task, task.evaluators(), &SearchConfig::default()).unwrap();
    let outcome = engine.run();
    assert_eq!(
        outcome.status,
        SearchStatus::Failed(FailureReason::InitialStateDeadEnd)
    );
    assert_eq!(outcome.statistics.expanded, 0);
    assert!(engine.plan().is_none());
}

#[test]
fn exhaustion_is_reported_by_every_tactic() {
    let world = GridWorld::parse(
        "
        S..#.
        ...#G
        ",
    )
    .unwrap();
    for tactic in TacticKind::DISCRETE {
        let report = run_search(&world, &SearchConfig::default().with_tactic(tactic)).unwrap();
        assert_eq!(
            report.status,
            SearchStatus::Failed(FailureReason::FrontierExhausted),
            "{tactic}"
        );
        assert!(report.plan.is_empty());
    }
}

#[test]
fn toml_configuration_drives_a_run() {
    let config = SearchConfig::from_toml_str(
        r#"
        seed = 21
        frontier = "bucket"
        action_interval = { expansions = 5 }

        [controller]
        type = "bandit"

        [controller_settings]
        exploration = 0.3

        [knobs]
        epsilon = 0.1
        "#,
    )
    .unwrap();
    assert_eq!(config.frontier, FrontierKind::Bucket);
    assert_eq!(config.controller, ControllerKind::Bandit);

    let report = run_search(&canonical_run::world(), &config).unwrap();
    assert!(report.is_solved());
    assert_eq!(report.seed, 21);
}

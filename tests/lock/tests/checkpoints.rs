//! Controller checkpoint locks.
//!
//! - A solved run writes the policy weights and the per-context usage
//!   counts next to them; the next run loads and extends both.
//! - The parameters controller runs with the knobs from its file.
//! - A network file drives the parametrized tactic's knobs.
//! - Missing or malformed files fall back to defaults and are overwritten on
//!   success.

use std::fs;
use std::path::Path;

use lock_tests::canonical_run;
use pathwise_harness::run_search;
use pathwise_harness::SearchWorld;
use pathwise_search::checkpoint::{load_floats, load_usage, usage_path};
use pathwise_search::{ControllerKind, SearchConfig, SearchEngine, SearchKnobs, TacticKind};

fn usage_total(path: &Path, rows: usize) -> u64 {
    load_usage(&usage_path(path), rows, TacticKind::DISCRETE.len())
        .unwrap()
        .iter()
        .flatten()
        .sum()
}

#[test]
fn bandit_checkpoint_round_trips_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let weights = dir.path().join("bandit.txt");
    let config = canonical_run::config().with_checkpoint_path(&weights);

    let first = run_search(&canonical_run::world(), &config).unwrap();
    assert!(first.is_solved());
    let estimates = load_floats(&weights).unwrap();
    assert_eq!(estimates.len(), TacticKind::DISCRETE.len());
    assert!(estimates.iter().all(|w| (0.0..=1.0).contains(w)));
    let first_periods: u64 = first.tactic_usage.values().sum();
    assert_eq!(usage_total(&weights, 1), first_periods);

    let second = run_search(&canonical_run::world(), &config).unwrap();
    assert!(second.is_solved());
    let second_periods: u64 = second.tactic_usage.values().sum();
    assert_eq!(usage_total(&weights, 1), first_periods + second_periods);
}

#[test]
fn softmax_checkpoint_has_one_row_per_context() {
    let dir = tempfile::tempdir().unwrap();
    let weights = dir.path().join("softmax.txt");
    let config = canonical_run::config()
        .with_controller(ControllerKind::Softmax)
        .with_checkpoint_path(&weights);

    let report = run_search(&canonical_run::world(), &config).unwrap();
    assert!(report.is_solved());
    let text = fs::read_to_string(&weights).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 4);
    assert!(rows
        .iter()
        .all(|row| row.split_whitespace().count() == TacticKind::DISCRETE.len()));
    assert_eq!(
        usage_total(&weights, 4),
        report.tactic_usage.values().sum::<u64>()
    );
}

#[test]
fn malformed_checkpoint_falls_back_and_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let weights = dir.path().join("bandit.txt");
    fs::write(&weights, "0.5 not-a-number\n").unwrap();
    fs::write(usage_path(&weights), "1 2 3\n").unwrap();

    let config = canonical_run::config().with_checkpoint_path(&weights);
    let report = run_search(&canonical_run::world(), &config).unwrap();
    assert!(report.is_solved());
    assert_eq!(load_floats(&weights).unwrap().len(), TacticKind::DISCRETE.len());
    assert_eq!(
        usage_total(&weights, 1),
        report.tactic_usage.values().sum::<u64>()
    );
}

#[test]
fn unsolved_run_leaves_the_checkpoint_alone() {
    let dir = tempfile::tempdir().unwrap();
    let weights = dir.path().join("bandit.txt");
    let config = canonical_run::config()
        .with_checkpoint_path(&weights)
        .with_max_expansions(2);
    let report = run_search(&canonical_run::world(), &config).unwrap();
    assert!(!report.is_solved());
    assert!(!weights.exists());
}

#[test]
fn parameters_file_sets_the_knobs() {
    let dir = tempfile::tempdir().unwrap();
    let params = dir.path().join("params.txt");
    fs::write(&params, "0 3 2 10 50 0.5\n").unwrap();

    let world = canonical_run::world();
    let config = SearchConfig::default()
        .with_controller(ControllerKind::Parameters)
        .with_params_path(&params);
    let mut engine = SearchEngine::new(&world, world.evaluators(), &config).unwrap();
    assert!(engine.run().is_solved());
    assert_eq!(
        *engine.knobs(),
        SearchKnobs {
            epsilon: 0.0,
            stall_size: 3,
            rollout_count: 2,
            rollout_length: 10,
            cycle_length: 50,
            local_fraction: 0.5,
            local_step_limit: SearchKnobs::default().local_step_limit,
        }
    );
    assert_eq!(
        load_floats(&params).unwrap(),
        vec![0.0, 3.0, 2.0, 10.0, 50.0, 0.5]
    );
}

#[test]
fn out_of_range_parameters_keep_the_configured_knobs() {
    let dir = tempfile::tempdir().unwrap();
    let params = dir.path().join("params.txt");
    fs::write(&params, "1.5 3 2 10 50 0.5\n").unwrap();

    let world = canonical_run::world();
    let config = SearchConfig::default()
        .with_controller(ControllerKind::Parameters)
        .with_params_path(&params);
    let mut engine = SearchEngine::new(&world, world.evaluators(), &config).unwrap();
    assert!(engine.run().is_solved());
    assert_eq!(*engine.knobs(), SearchKnobs::default());
}

#[test]
fn network_file_drives_the_knobs() {
    let dir = tempfile::tempdir().unwrap();
    let network = dir.path().join("network.txt");
    // one linear layer, 7 inputs -> 6 outputs, zero weights: outputs = biases
    let mut text = String::from("1\n6 7\n");
    for _ in 0..6 {
        text.push_str("0 0 0 0 0 0 0\n");
    }
    text.push_str("0 0.1 0.2 0.3 0.05 0\n");
    fs::write(&network, &text).unwrap();

    let world = canonical_run::world();
    let config = SearchConfig::default()
        .with_controller(ControllerKind::Network)
        .with_checkpoint_path(&network);
    let mut engine = SearchEngine::new(&world, world.evaluators(), &config).unwrap();
    assert!(engine.run().is_solved());
    assert_eq!(engine.active_tactic(), Some(TacticKind::Parametrized));

    let knobs = engine.knobs();
    assert!((knobs.epsilon - 0.5).abs() < 1e-12);
    assert!((knobs.local_fraction - 0.5).abs() < 1e-12);
    assert_eq!(
        (
            knobs.stall_size,
            knobs.rollout_count,
            knobs.rollout_length,
            knobs.cycle_length
        ),
        (5, 2, 30, 50)
    );
    // saved unchanged
    assert_eq!(
        load_floats(&network).unwrap(),
        load_floats_from(&text)
    );
}

fn load_floats_from(text: &str) -> Vec<f64> {
    pathwise_search::checkpoint::parse_floats(text).unwrap()
}

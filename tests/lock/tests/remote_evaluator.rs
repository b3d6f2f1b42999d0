//! Remote evaluator round trips over a Unix-domain socket.
//!
//! - A remote linear model equal to the local heuristic yields the same
//!   report, digest included, as the local run.
//! - Every evaluation is one request on the wire.
//! - A server that goes away mid-search fails the run without a plan.
//! - A missing socket is a connect error before any search starts.
#![cfg(unix)]

use std::os::unix::net::UnixListener;
use std::thread;

use lock_tests::canonical_run;
use pathwise_harness::server::{serve, serve_connection};
use pathwise_harness::{run_search, run_with_evaluators};
use pathwise_search::error::RemoteStage;
use pathwise_search::evaluator::{wire, LinearModel, RemoteEvaluator};
use pathwise_search::{EvaluatorGateway, FailureReason, SearchError, SearchStatus};

fn manhattan_model() -> LinearModel {
    LinearModel::new(0.0, vec![1.0, 1.0])
}

#[test]
fn remote_model_reproduces_the_local_run() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("heuristic.sock");
    let listener = UnixListener::bind(&socket).unwrap();
    let server = thread::spawn(move || serve(&listener, &manhattan_model(), Some(1)).unwrap());

    let world = canonical_run::world();
    let config = canonical_run::config();
    let remote = RemoteEvaluator::connect(&socket, world.encoder()).unwrap();
    let evaluators = EvaluatorGateway::new().with_priority_and_preferred(remote);
    let remote_report = run_with_evaluators(&world, evaluators, &config).unwrap();
    // the evaluator is dropped with the engine, which ends the connection
    let served = server.join().unwrap();

    let local_report = run_search(&world, &config).unwrap();
    assert!(remote_report.is_solved());
    assert_eq!(remote_report.plan, local_report.plan);
    assert_eq!(remote_report.digest, local_report.digest);
    assert_eq!(served, remote_report.statistics.evaluated);
}

#[test]
fn server_handles_sequential_connections() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("heuristic.sock");
    let listener = UnixListener::bind(&socket).unwrap();
    let server = thread::spawn(move || serve(&listener, &manhattan_model(), Some(2)).unwrap());

    let world = canonical_run::world();
    let mut evaluated = 0;
    for seed in [1, 2] {
        let remote = RemoteEvaluator::connect(&socket, world.encoder()).unwrap();
        let config = canonical_run::config().with_seed(seed);
        let report =
            run_with_evaluators(&world, EvaluatorGateway::single(remote), &config).unwrap();
        assert!(report.is_solved());
        evaluated += report.statistics.evaluated;
    }
    assert_eq!(server.join().unwrap(), evaluated);
}

#[test]
fn vanished_server_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("heuristic.sock");
    let listener = UnixListener::bind(&socket).unwrap();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let model = manhattan_model();
        for _ in 0..3 {
            let features = wire::read_values(&mut stream, 2).unwrap().unwrap();
            wire::write_values(&mut stream, &[model.predict(&features).unwrap()]).unwrap();
        }
    });

    let world = canonical_run::world();
    let remote = RemoteEvaluator::connect(&socket, world.encoder()).unwrap();
    let report = run_with_evaluators(
        &world,
        EvaluatorGateway::single(remote),
        &canonical_run::config(),
    )
    .unwrap();
    server.join().unwrap();

    assert!(matches!(
        report.status,
        SearchStatus::Failed(FailureReason::Evaluator(_))
    ));
    assert!(report.plan.is_empty());
    assert_eq!(report.plan_cost, None);
}

#[test]
fn missing_socket_is_a_connect_error() {
    let dir = tempfile::tempdir().unwrap();
    let world = canonical_run::world();
    let err = RemoteEvaluator::connect(&dir.path().join("absent.sock"), world.encoder())
        .unwrap_err();
    assert!(matches!(
        err,
        SearchError::Remote {
            stage: RemoteStage::Connect,
            ..
        }
    ));
}

#[test]
fn in_memory_pair_speaks_the_same_protocol() {
    let (client, mut server_end) = std::os::unix::net::UnixStream::pair().unwrap();
    let server = thread::spawn(move || serve_connection(&mut server_end, &manhattan_model()).unwrap());

    let world = canonical_run::world();
    let mut remote = RemoteEvaluator::new(client, world.encoder());
    let reply = remote.query(&[3.0, 4.0]).unwrap();
    assert!((reply - 7.0).abs() < f64::EPSILON);
    assert_eq!(remote.round_trips(), 1);
    assert!(matches!(
        remote.query(&[1.0]),
        Err(SearchError::FeatureArity {
            expected: 2,
            actual: 1
        })
    ));
    drop(remote);
    assert_eq!(server.join().unwrap(), 1);
}

//! Cross-process determinism of the canonical run.
//!
//! Spawns the `run_fixture` binary under 4 environment variants and asserts
//! all produce identical output, equal to the in-process run.

use std::path::Path;
use std::process::Command;

use lock_tests::canonical_run;

fn binary_path() -> String {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push("run_fixture");
    path.to_string_lossy().to_string()
}

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

fn run_variant(work_dir: &str, env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path();

    let mut command = Command::new(&bin);
    command.current_dir(work_dir);

    command
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE");

    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });

    assert!(
        output.status.success(),
        "run_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_determinism_four_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[]);

    assert!(
        baseline.contains("digest=sha256:"),
        "baseline output missing digest"
    );
    assert!(
        baseline.contains("status=solved"),
        "baseline output missing status=solved"
    );
    assert!(
        baseline.contains("plan_cost="),
        "baseline output missing plan_cost"
    );

    // Variant 2: different cwd.
    let alt_cwd = if cfg!(target_os = "windows") {
        "C:\\"
    } else {
        "/tmp"
    };
    let variant_cwd = run_variant(alt_cwd, &[]);
    assert_eq!(
        baseline, variant_cwd,
        "output differs when cwd changes from {root} to {alt_cwd}"
    );

    // Variant 3: different locale env.
    let variant_locale = run_variant(&root, &[("LC_ALL", "C"), ("LANG", "C")]);
    assert_eq!(
        baseline, variant_locale,
        "output differs when LC_ALL=C LANG=C"
    );

    // Variant 4: spurious env vars.
    let variant_noise = run_variant(
        &root,
        &[
            ("PATHWISE_NOISE", "should_not_matter"),
            ("TZ", "America/New_York"),
            ("HOME", "/nonexistent"),
        ],
    );
    assert_eq!(
        baseline, variant_noise,
        "output differs with spurious env vars"
    );
}

#[test]
fn crossproc_output_matches_in_process_run() {
    let root = workspace_root();
    let from_binary = run_variant(&root, &[]);
    let in_process: String = canonical_run::lines(&canonical_run::report())
        .into_iter()
        .map(|line| line + "\n")
        .collect();
    assert_eq!(from_binary, in_process);
}

#[test]
fn in_process_runs_are_identical() {
    let baseline = canonical_run::report();
    assert!(baseline.is_solved());
    assert!(baseline.verify_digest());
    for _ in 0..10 {
        assert_eq!(canonical_run::report(), baseline);
    }
}

#[test]
fn different_seeds_may_differ_but_stay_valid() {
    let world = canonical_run::world();
    for seed in 0..5 {
        let config = canonical_run::config().with_seed(seed);
        let report = pathwise_harness::run_search(&world, &config).unwrap();
        assert!(report.is_solved(), "seed {seed}");
        assert!(report.verify_digest());
        assert_eq!(report.seed, seed);
    }
}

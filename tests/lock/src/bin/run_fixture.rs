//! Binary that runs the canonical maze search and prints deterministic
//! output lines for cross-process verification.
//!
//! Usage: `run_fixture`
//!
//! Output: key=value lines (see `lock_tests::canonical_run::lines`).

use lock_tests::canonical_run;

fn main() {
    let report = canonical_run::report();
    for line in canonical_run::lines(&report) {
        println!("{line}");
    }
}

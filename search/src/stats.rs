//! Run counters and heuristic progress tracking.

use serde::Serialize;

/// Monotone counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStatistics {
    /// States popped and expanded (goal included).
    pub expanded: u64,
    /// Calls into the evaluator gateway.
    pub evaluated: u64,
    /// Successors generated.
    pub generated: u64,
    /// Closed states moved back to open.
    pub reopened: u64,
    /// States marked dead end.
    pub dead_ends: u64,
    /// Stale frontier entries discarded on pop.
    pub stale_pops: u64,
    /// Rollouts started.
    pub rollouts: u64,
}

/// Best heuristic value seen so far and the plateau counter.
///
/// `expansions_without_progress` goes up by one per expansion and drops to
/// zero whenever a heuristic value strictly below the best one so far is
/// observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressTracker {
    initial_h: Option<i64>,
    best_h: Option<i64>,
    expansions_without_progress: u64,
}

impl ProgressTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with the heuristic value of the initial state.
    pub fn start(&mut self, initial_h: i64) {
        self.initial_h = Some(initial_h);
        self.best_h = Some(initial_h);
        self.expansions_without_progress = 0;
    }

    pub fn record_expansion(&mut self) {
        self.expansions_without_progress += 1;
    }

    /// Observe a successor's heuristic value. Returns `true` on a new best.
    pub fn observe(&mut self, h: i64) -> bool {
        match self.best_h {
            Some(best) if h >= best => false,
            _ => {
                self.best_h = Some(h);
                self.expansions_without_progress = 0;
                true
            }
        }
    }

    #[must_use]
    pub fn initial_h(&self) -> Option<i64> {
        self.initial_h
    }

    #[must_use]
    pub fn best_h(&self) -> Option<i64> {
        self.best_h
    }

    #[must_use]
    pub fn expansions_without_progress(&self) -> u64 {
        self.expansions_without_progress
    }

    /// Whether the plateau counter exceeds `stall_size`.
    #[must_use]
    pub fn is_stalled(&self, stall_size: u32) -> bool {
        self.expansions_without_progress > u64::from(stall_size)
    }
}

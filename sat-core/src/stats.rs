//! Monotone solve-time counters.
//!
//! Every counter only grows over the lifetime of a [`crate::solver::Solver`]; a restart does not
//! reset them (only `conflicts_since_restart`, internal to [`crate::restart::RestartPolicy`],
//! resets).

/// Counters describing the work a [`crate::solver::Solver`] has done so far.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub restarts: u64,
    pub conflicts: u64,
    pub propagations: u64,
    pub decisions: u64,
    pub backtracks: u64,
    pub learned_clauses: u64,
    pub max_decision_level: u32,
}

impl Stats {
    pub fn new() -> Stats {
        Stats::default()
    }

    pub(crate) fn note_decision_level(&mut self, level: u32) {
        self.max_decision_level = self.max_decision_level.max(level);
    }
}

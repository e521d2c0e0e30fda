//! Dispatch accounting.

use serde::Serialize;

/// Outcome of one pass over a single registry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnumerateStats {
    /// Callables that ran.
    pub invoked: usize,
    /// Entries dropped because their target had died.
    pub pruned: usize,
    /// One-shot entries consumed by this pass.
    pub spent: usize,
}

/// Outcome of one `dispatch`/`notify` call across the whole forwarding graph.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Distinct event nodes reached (the origin included).
    pub events_visited: usize,
    pub invoked: usize,
    pub pruned: usize,
    pub spent: usize,
    /// Forwarding edges dropped because the downstream event was gone.
    pub forwarding_pruned: usize,
}

impl DispatchReport {
    pub(crate) fn absorb(&mut self, stats: EnumerateStats) {
        self.invoked += stats.invoked;
        self.pruned += stats.pruned;
        self.spent += stats.spent;
    }
}

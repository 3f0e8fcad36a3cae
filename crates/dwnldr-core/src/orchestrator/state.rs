//! Orchestration state and progress aggregation.
//!
//! Owned and mutated only by the orchestrator loop.

use std::collections::{BTreeMap, BTreeSet};

use super::DispatchMode;

#[derive(Debug, Clone)]
pub struct OrchestrationState {
    total: usize,
    completed: usize,
    dispatched: usize,
    latest_fraction: BTreeMap<usize, f64>,
    failed: BTreeSet<usize>,
    pub dispatch_mode: DispatchMode,
    /// Per-task receive ceiling in bytes/sec (0 = unlimited).
    pub rate_cap: u64,
}

impl OrchestrationState {
    pub fn new(total: usize, dispatch_mode: DispatchMode, rate_cap: u64) -> Self {
        Self {
            total,
            completed: 0,
            dispatched: 0,
            latest_fraction: BTreeMap::new(),
            failed: BTreeSet::new(),
            dispatch_mode,
            rate_cap,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Tasks dispatched but not yet completed.
    #[cfg(test)]
    fn active(&self) -> usize {
        self.dispatched.saturating_sub(self.completed)
    }

    pub fn failed(&self) -> &BTreeSet<usize> {
        &self.failed
    }

    pub fn is_failed(&self, slot: usize) -> bool {
        self.failed.contains(&slot)
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }

    /// Records a dispatch; returns the index (0-based) of the task to launch, or
    /// `None` once every task has been handed out.
    pub fn next_dispatch(&mut self) -> Option<usize> {
        if self.dispatched >= self.total {
            return None;
        }
        self.dispatched += 1;
        Some(self.dispatched - 1)
    }

    /// Counts one completion signal. Returns `true` when this was the last one.
    pub fn record_completion(&mut self) -> bool {
        if self.completed < self.total {
            self.completed += 1;
        } else {
            tracing::warn!(total = self.total, "completion signal beyond task count ignored");
        }
        self.is_done()
    }

    /// Stores a progress fraction for `slot` and returns the effective value.
    ///
    /// The stored value never goes backwards, and a failed slot stays at `1.0`.
    pub fn record_progress(&mut self, slot: usize, fraction: f64) -> f64 {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let entry = self.latest_fraction.entry(slot).or_insert(fraction);
        if self.failed.contains(&slot) {
            *entry = 1.0;
        } else if fraction > *entry {
            *entry = fraction;
        }
        *entry
    }

    /// Marks `slot` as failed, forcing its fraction to `1.0` from now on.
    pub fn record_failure(&mut self, slot: usize) {
        self.failed.insert(slot);
        self.latest_fraction.insert(slot, 1.0);
    }

    #[cfg(test)]
    fn fraction(&self, slot: usize) -> Option<f64> {
        self.latest_fraction.get(&slot).copied()
    }

    /// Arithmetic mean of every known per-task fraction. Tasks that have not
    /// reported yet are left out, not counted as zero.
    pub fn aggregate(&self) -> Option<f64> {
        if self.latest_fraction.is_empty() {
            return None;
        }
        let sum: f64 = self.latest_fraction.values().sum();
        Some(sum / self.latest_fraction.len() as f64)
    }
}

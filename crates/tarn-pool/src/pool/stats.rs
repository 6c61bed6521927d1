//! Pool statistics types

use serde::{Deserialize, Serialize};

/// Snapshot of a pool's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Total sessions issued (idle + checked out)
    total: usize,
    /// Sessions sitting in the idle queue
    idle: usize,
    /// Sessions currently checked out
    active: usize,
    /// Callers blocked waiting for a release
    waiting: usize,
}

impl PoolStats {
    /// Create new pool statistics
    pub fn new(total: usize, idle: usize, active: usize, waiting: usize) -> Self {
        Self {
            total,
            idle,
            active,
            waiting,
        }
    }

    /// Total sessions issued
    pub fn total(&self) -> usize {
        self.total
    }

    /// Sessions in the idle queue
    pub fn idle(&self) -> usize {
        self.idle
    }

    /// Sessions currently checked out
    pub fn active(&self) -> usize {
        self.active
    }

    /// Callers blocked waiting for a release
    pub fn waiting(&self) -> usize {
        self.waiting
    }

    /// Fraction of issued sessions currently checked out (0.0 to 1.0).
    /// Returns 0.0 for an empty pool.
    pub fn utilization(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.active as f64 / self.total as f64
        }
    }

    /// Whether every issued session is checked out
    pub fn is_full(&self) -> bool {
        self.idle == 0 && self.total > 0
    }
}

impl Default for PoolStats {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

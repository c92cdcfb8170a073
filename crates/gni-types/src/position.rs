use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of an event log in the input stream.
///
/// Ordering: `block_number` → `log_index` (total order). The stream is
/// non-decreasing in this order; ties within a block are broken by
/// `log_index` ascending.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventPosition {
    pub block_number: u64,
    pub log_index: u64,
}

impl EventPosition {
    pub fn new(block_number: u64, log_index: u64) -> Self {
        Self {
            block_number,
            log_index,
        }
    }

    /// The position before any real event.
    pub const fn genesis() -> Self {
        Self {
            block_number: 0,
            log_index: 0,
        }
    }

    /// Returns `true` if this position comes strictly after `other`.
    pub fn is_after(&self, other: &Self) -> bool {
        self > other
    }
}

impl PartialOrd for EventPosition {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventPosition {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.block_number
            .cmp(&other.block_number)
            .then(self.log_index.cmp(&other.log_index))
    }
}

impl fmt::Debug for EventPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventPosition(#{}:{})", self.block_number, self.log_index)
    }
}

impl fmt::Display for EventPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.block_number, self.log_index)
    }
}

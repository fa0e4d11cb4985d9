use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use crate::common::{Configuration, Solution};
use crate::solver::comm::{ConstraintId, HighLevelNode};
use crate::stat::Stats;

/// One phase of work per `step` call, in the order the driver cycles
/// through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Select,
    PopConstraint,
    ExpandTree,
    Generate,
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Running,
    Solved,
    NoSolution,
}

/// The full mutable search state. Everything a step can touch lives here,
/// so a snapshot is a plain clone and a restore is a plain assignment;
/// nodes and constraint-tree entries are id-indexed, leaving no pointers
/// to relocate.
#[derive(Debug, Clone)]
pub(crate) struct SearchState {
    /// Node arena; a node's id is its index. Never shrinks during a run.
    pub(crate) nodes: Vec<HighLevelNode>,
    /// Depth-first frontier of node ids; top of stack is the last element.
    pub(crate) open: Vec<usize>,
    /// Fingerprint of every discovered configuration, mapped to the node
    /// that first produced it. Sole deduplication mechanism.
    pub(crate) explored: FxHashMap<u64, usize>,
    pub(crate) current_high: Option<usize>,
    pub(crate) current_low: Option<ConstraintId>,
    pub(crate) phase: Phase,
    pub(crate) status: SearchStatus,
    pub(crate) pending: Option<Configuration>,
    pub(crate) solution: Option<Solution>,
    pub(crate) stats: Stats,
}

impl SearchState {
    pub(crate) fn new() -> Self {
        SearchState {
            nodes: Vec::new(),
            open: Vec::new(),
            explored: FxHashMap::default(),
            current_high: None,
            current_low: None,
            phase: Phase::Select,
            status: SearchStatus::Running,
            pending: None,
            solution: None,
            stats: Stats::default(),
        }
    }
}

pub(crate) const SNAPSHOT_CAPACITY: usize = 200;

/// Bounded FIFO of state snapshots backing `step_back`.
#[derive(Debug, Clone)]
pub(crate) struct SnapshotHistory {
    snapshots: VecDeque<SearchState>,
    capacity: usize,
}

impl SnapshotHistory {
    pub(crate) fn new(capacity: usize) -> Self {
        SnapshotHistory {
            snapshots: VecDeque::new(),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, state: SearchState) {
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(state);
    }

    pub(crate) fn pop(&mut self) -> Option<SearchState> {
        self.snapshots.pop_back()
    }

    pub(crate) fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded_fifo() {
        let mut history = SnapshotHistory::new(3);
        for i in 0..5 {
            let mut state = SearchState::new();
            state.stats.steps = i;
            history.push(state);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.pop().unwrap().stats.steps, 4);
        assert_eq!(history.pop().unwrap().stats.steps, 3);
        assert_eq!(history.pop().unwrap().stats.steps, 2);
        assert!(history.pop().is_none());
    }
}

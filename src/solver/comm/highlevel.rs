use tracing::debug;

use super::lowlevel::ConstraintTree;
use crate::common::{Agent, Configuration};
use crate::distance::DistanceOracle;
use crate::graph::Graph;

/// A discovered configuration together with its search bookkeeping.
/// EXPLORED holds the authoritative reference; OPEN and parent links are
/// ids into the solver's node arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighLevelNode {
    pub id: usize,
    pub config: Configuration,
    /// Priority order assigned at creation, never mutated.
    pub order: Vec<usize>,
    pub tree: ConstraintTree,
    pub parent: Option<usize>,
}

impl HighLevelNode {
    pub(crate) fn new(
        id: usize,
        config: Configuration,
        order: Vec<usize>,
        parent: Option<usize>,
    ) -> Self {
        debug!("high level node {id}: config {:?}", config.positions());
        HighLevelNode {
            id,
            config,
            order,
            tree: ConstraintTree::new(),
            parent,
        }
    }
}

/// Order for the start configuration: descending distance from start to
/// goal, ties by agent id.
pub(crate) fn initial_priority_order(
    graph: &Graph,
    oracle: &mut DistanceOracle,
    agents: &[Agent],
) -> Vec<usize> {
    let distances: Vec<_> = agents
        .iter()
        .map(|agent| oracle.distance(graph, agent.start, agent.goal))
        .collect();
    let mut order: Vec<usize> = (0..agents.len()).collect();
    order.sort_by(|&a, &b| distances[b].cmp(&distances[a]).then(a.cmp(&b)));
    order
}

/// Order for successor configurations: agents still away from their goal
/// first, then descending distance-to-goal, ties by agent id.
pub(crate) fn successor_priority_order(
    graph: &Graph,
    oracle: &mut DistanceOracle,
    agents: &[Agent],
    config: &Configuration,
) -> Vec<usize> {
    let distances: Vec<_> = agents
        .iter()
        .map(|agent| oracle.distance(graph, config.get(agent.id), agent.goal))
        .collect();
    let mut order: Vec<usize> = (0..agents.len()).collect();
    order.sort_by(|&a, &b| {
        let a_done = distances[a] == 0;
        let b_done = distances[b] == 0;
        a_done
            .cmp(&b_done)
            .then(distances[b].cmp(&distances[a]))
            .then(a.cmp(&b))
    });
    order
}

use rustc_hash::{FxHashSet, FxHasher};
use serde::{Deserialize, Serialize};
use std::hash::Hasher;
use tracing::{debug, error};

use crate::graph::{Graph, VertexId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Agent {
    pub id: usize,
    pub start: VertexId,
    pub goal: VertexId,
}

impl Agent {
    pub fn verify(&self, graph: &Graph) -> bool {
        graph.contains(self.start) && graph.contains(self.goal)
    }
}

/// Joint position of all agents at one timestep, indexed by agent id.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    positions: Vec<VertexId>,
}

impl Configuration {
    pub fn new(positions: Vec<VertexId>) -> Self {
        Configuration { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, agent: usize) -> VertexId {
        self.positions[agent]
    }

    pub fn positions(&self) -> &[VertexId] {
        &self.positions
    }

    /// Content hash of the ordered position sequence. `FxHasher` is
    /// unseeded, so equal sequences fingerprint identically across runs.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write_usize(self.positions.len());
        for &v in &self.positions {
            hasher.write_usize(v);
        }
        hasher.finish()
    }
}

/// A solved instance: `T + 1` configurations describing `T` synchronous moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub configurations: Vec<Configuration>,
}

impl Solution {
    pub fn makespan(&self) -> usize {
        self.configurations.len().saturating_sub(1)
    }

    pub fn verify(&self, graph: &Graph, agents: &[Agent]) -> bool {
        let Some(first) = self.configurations.first() else {
            error!("empty solution");
            return false;
        };
        let last = self.configurations.last().unwrap();

        for config in &self.configurations {
            if config.len() != agents.len() {
                error!("incomplete configuration");
                return false;
            }
        }

        for agent in agents {
            if first.get(agent.id) != agent.start || last.get(agent.id) != agent.goal {
                error!(
                    "start and goal failed for agent {}: path start {:?} path end {:?}, but agent start {:?} agent goal {:?}",
                    agent.id,
                    first.get(agent.id),
                    last.get(agent.id),
                    agent.start,
                    agent.goal
                );
                return false;
            }
        }

        for config in &self.configurations {
            let mut seen_positions = FxHashSet::default();
            for &pos in config.positions() {
                if !graph.contains(pos) {
                    error!("impossible position {pos:?}");
                    return false;
                }
                if !seen_positions.insert(pos) {
                    error!("vertex conflict at {pos:?}");
                    return false;
                }
            }
        }

        for window in self.configurations.windows(2) {
            let [from, to] = window else { unreachable!() };
            for agent in agents {
                let u = from.get(agent.id);
                let v = to.get(agent.id);
                if u != v && !graph.has_edge(u, v) {
                    error!("move step failed for agent {}: {u:?} -> {v:?}", agent.id);
                    return false;
                }
            }
            for i in 0..agents.len() {
                for j in (i + 1)..agents.len() {
                    if from.get(i) == to.get(j) && from.get(j) == to.get(i) {
                        error!("swap conflict between agents {i} and {j}");
                        return false;
                    }
                }
            }
        }

        true
    }

    pub fn log_solution(&self, graph: &Graph) {
        let mut formatted_solution = String::new();
        for (t, config) in self.configurations.iter().enumerate() {
            formatted_solution.push_str(&format!(" t{}:", t));
            for &pos in config.positions() {
                let label = graph.label(pos).unwrap_or("?");
                formatted_solution.push_str(&format!(" {}", label));
            }
            formatted_solution.push('\n');
        }
        debug!("solution:\n{}", formatted_solution);
    }
}

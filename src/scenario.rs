use anyhow::{bail, Context, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::info;

use crate::common::Agent;
use crate::graph::{Graph, VertexId};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AgentYaml {
    pub start: VertexId,
    pub goal: VertexId,
}

/// A solver instance on disk: a vertex count, an edge list, and the
/// agents. Vertices are labeled in creation order (a, b, c, ...).
#[derive(Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub vertices: usize,
    pub edges: Vec<[VertexId; 2]>,
    pub agent: Vec<AgentYaml>,
}

impl Scenario {
    pub fn from_yaml(path: &str) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("failed to read scenario {path}"))?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let scenario: Self = serde_yaml::from_str(text)?;
        Ok(scenario)
    }

    pub fn to_graph(&self) -> Result<Graph> {
        let mut graph = Graph::new();
        for _ in 0..self.vertices {
            graph.add_vertex();
        }
        for &[u, w] in &self.edges {
            if !graph.add_edge(u, w) {
                bail!("invalid edge {u}-{w}");
            }
        }
        Ok(graph)
    }

    pub fn to_agents(&self, graph: &Graph) -> Result<Vec<Agent>> {
        let mut agents = Vec::new();
        for (index, agent_yaml) in self.agent.iter().enumerate() {
            let agent = Agent {
                id: index,
                start: agent_yaml.start,
                goal: agent_yaml.goal,
            };
            if !agent.verify(graph) {
                bail!("verification failed for agent at index {index}");
            }
            agents.push(agent);
        }
        Ok(agents)
    }

    /// Draws distinct starts and distinct goals from the graph's vertices.
    pub fn generate_agents_randomly<R: Rng + ?Sized>(
        graph: &Graph,
        num_agents: usize,
        rng: &mut R,
    ) -> Result<Vec<Agent>, String> {
        let vertices: Vec<VertexId> = graph.vertex_ids().collect();
        if vertices.len() < num_agents {
            return Err("not enough vertices to place the requested agents".to_string());
        }

        let mut starts = vertices.clone();
        starts.shuffle(rng);
        let mut goals = vertices;
        goals.shuffle(rng);

        let agents: Vec<Agent> = (0..num_agents)
            .map(|id| Agent {
                id,
                start: starts[id],
                goal: goals[id],
            })
            .collect();

        info!("Generate scen: {agents:?}");
        Ok(agents)
    }
}

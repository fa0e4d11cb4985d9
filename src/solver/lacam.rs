use anyhow::{bail, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::time::Instant;
use tracing::{debug, error, instrument, trace};

use super::comm::{
    initial_priority_order, successor_priority_order, ConstraintId, ConstraintTree, HighLevelNode,
};
use super::pibt::plan_step;
use super::state::{Phase, SearchState, SearchStatus, SnapshotHistory, SNAPSHOT_CAPACITY};
use super::Solver;
use crate::common::{Agent, Configuration, Solution};
use crate::distance::DistanceOracle;
use crate::graph::{Graph, VertexId};
use crate::stat::Stats;

/// Lazy-constraints-addition search over joint configurations.
///
/// The driver is a phase state machine: one `step` call performs one
/// phase of work, so a UI or test can observe every intermediate state.
/// A snapshot of the whole search state is taken before each step,
/// backing `step_back`.
pub struct LaCAM {
    graph: Graph,
    agents: Vec<Agent>,
    oracle: DistanceOracle,
    goal: Configuration,
    state: SearchState,
    history: SnapshotHistory,
}

impl LaCAM {
    pub fn new(agents: Vec<Agent>, graph: &Graph) -> Self {
        let goal = Configuration::new(agents.iter().map(|agent| agent.goal).collect());
        LaCAM {
            graph: graph.clone(),
            agents,
            oracle: DistanceOracle::new(),
            goal,
            state: SearchState::new(),
            history: SnapshotHistory::new(SNAPSHOT_CAPACITY),
        }
    }

    /// Validates the instance and rebuilds the search state around the
    /// start configuration. Leaves the previous state untouched on error.
    #[instrument(skip_all, level = "debug")]
    pub fn initialize(&mut self) -> Result<()> {
        if self.agents.is_empty() {
            bail!("no agents defined");
        }
        if self.graph.vertex_count() < 2 {
            bail!("graph needs at least two vertices");
        }
        let mut starts = FxHashSet::default();
        let mut goals = FxHashSet::default();
        for (index, agent) in self.agents.iter().enumerate() {
            if agent.id != index {
                bail!("agent ids must be dense and ordered, got {} at {}", agent.id, index);
            }
            if !agent.verify(&self.graph) {
                bail!("agent {} has a start or goal outside the graph", agent.id);
            }
            if !starts.insert(agent.start) {
                bail!("agents share start vertex {}", agent.start);
            }
            if !goals.insert(agent.goal) {
                bail!("agents share goal vertex {}", agent.goal);
            }
        }

        self.oracle.clear();
        self.oracle
            .preload(&self.graph, self.agents.iter().map(|agent| agent.goal));

        let config = Configuration::new(self.agents.iter().map(|agent| agent.start).collect());
        let order = initial_priority_order(&self.graph, &mut self.oracle, &self.agents);

        let mut state = SearchState::new();
        state.explored.insert(config.fingerprint(), 0);
        state.nodes.push(HighLevelNode::new(0, config, order, None));
        state.open.push(0);
        // The start node counts as both generated and explored; the two
        // counters advance together and stay equal.
        state.stats.nodes_generated = 1;
        state.stats.configurations_explored = 1;

        self.state = state;
        self.history.clear();
        debug!("initialized with {} agents", self.agents.len());
        Ok(())
    }

    pub fn reset(&mut self) -> Result<()> {
        self.initialize()
    }

    /// Advances one phase. Returns false once the search has terminated.
    pub fn step(&mut self) -> bool {
        if self.state.status != SearchStatus::Running {
            return false;
        }
        self.history.push(self.state.clone());
        self.state.stats.steps += 1;

        match self.state.phase {
            Phase::Select => self.phase_select(),
            Phase::PopConstraint => self.phase_pop_constraint(),
            Phase::ExpandTree => self.phase_expand_tree(),
            Phase::Generate => self.phase_generate(),
            Phase::Check => self.phase_check(),
        }

        self.state.status == SearchStatus::Running
    }

    /// Restores the snapshot taken before the most recent step. Returns
    /// false when no history remains.
    pub fn step_back(&mut self) -> bool {
        match self.history.pop() {
            Some(state) => {
                self.state = state;
                true
            }
            None => false,
        }
    }

    fn phase_select(&mut self) {
        let Some(&top) = self.state.open.last() else {
            debug!("open exhausted, no solution");
            self.state.current_high = None;
            self.state.current_low = None;
            self.state.status = SearchStatus::NoSolution;
            return;
        };

        if self.state.nodes[top].config == self.goal {
            debug!("goal configuration reached at node {top}");
            self.state.current_high = Some(top);
            self.state.solution = Some(self.reconstruct(top));
            self.state.status = SearchStatus::Solved;
            return;
        }

        if self.state.nodes[top].tree.queue_is_empty() {
            trace!("node {top} exhausted, backtracking");
            self.state.open.pop();
            self.state.current_high = None;
            self.state.current_low = None;
            return;
        }

        self.state.current_high = Some(top);
        self.state.current_low = None;
        self.state.phase = Phase::PopConstraint;
    }

    fn phase_pop_constraint(&mut self) {
        let node_id = self.state.current_high.unwrap();
        let constraint = self.state.nodes[node_id].tree.pop_front().unwrap();
        trace!("node {node_id}: constraint {constraint}");
        self.state.current_low = Some(constraint);
        self.state.phase = Phase::ExpandTree;
    }

    fn phase_expand_tree(&mut self) {
        let node_id = self.state.current_high.unwrap();
        let constraint = self.state.current_low.unwrap();
        let node = &mut self.state.nodes[node_id];
        let depth = node.tree.node(constraint).depth;

        if depth < self.agents.len() {
            let who = node.order[depth];
            let from = node.config.get(who);
            let mut moves: SmallVec<[VertexId; 5]> = SmallVec::new();
            moves.push(from);
            moves.extend(self.graph.neighbors(from).iter().copied());
            node.tree.expand(constraint, who, &moves);
        }

        self.state.phase = Phase::Generate;
    }

    fn phase_generate(&mut self) {
        let node_id = self.state.current_high.unwrap();
        let constraint = self.state.current_low.unwrap();
        let constraints = self.state.nodes[node_id].tree.collect_constraints(constraint);

        match plan_step(
            &self.graph,
            &mut self.oracle,
            &self.agents,
            &self.state.nodes[node_id].config,
            &constraints,
        ) {
            Some(config) => {
                self.state.pending = Some(config);
                self.state.phase = Phase::Check;
            }
            None => {
                self.state.pending = None;
                self.state.phase = Phase::Select;
            }
        }
    }

    fn phase_check(&mut self) {
        let config = self.state.pending.take().unwrap();
        let fingerprint = config.fingerprint();

        if self.state.explored.contains_key(&fingerprint) {
            trace!("configuration already explored, dropped");
            self.state.phase = Phase::Select;
            return;
        }

        let order = successor_priority_order(&self.graph, &mut self.oracle, &self.agents, &config);
        let id = self.state.nodes.len();
        self.state
            .nodes
            .push(HighLevelNode::new(id, config, order, self.state.current_high));
        self.state.open.push(id);
        self.state.explored.insert(fingerprint, id);
        self.state.stats.nodes_generated += 1;
        self.state.stats.configurations_explored += 1;
        self.state.phase = Phase::Select;
    }

    fn reconstruct(&self, id: usize) -> Solution {
        let mut configurations = Vec::new();
        let mut cursor = Some(id);
        while let Some(node_id) = cursor {
            configurations.push(self.state.nodes[node_id].config.clone());
            cursor = self.state.nodes[node_id].parent;
        }
        configurations.reverse();
        Solution { configurations }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn status(&self) -> SearchStatus {
        self.state.status
    }

    pub fn stats(&self) -> &Stats {
        &self.state.stats
    }

    /// Configuration of the current high-level node, falling back to the
    /// top of OPEN.
    pub fn current_configuration(&self) -> Option<&Configuration> {
        self.state
            .current_high
            .or_else(|| self.state.open.last().copied())
            .map(|id| &self.state.nodes[id].config)
    }

    /// OPEN contents in stack order, top first.
    pub fn open(&self) -> impl Iterator<Item = &HighLevelNode> {
        self.state
            .open
            .iter()
            .rev()
            .map(|&id| &self.state.nodes[id])
    }

    pub fn explored(&self) -> &FxHashMap<u64, usize> {
        &self.state.explored
    }

    pub fn node(&self, id: usize) -> Option<&HighLevelNode> {
        self.state.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.state.nodes.len()
    }

    pub fn current_constraint_tree(&self) -> Option<&ConstraintTree> {
        self.state
            .current_high
            .map(|id| &self.state.nodes[id].tree)
    }

    pub fn current_constraint(&self) -> Option<ConstraintId> {
        self.state.current_low
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.state.solution.as_ref()
    }
}

impl Solver for LaCAM {
    fn solve(&mut self) -> Option<Solution> {
        let total_solve_start_time = Instant::now();
        if let Err(err) = self.initialize() {
            error!("initialize failed: {err:#}");
            return None;
        }

        while self.step() {}

        self.state.stats.time_ms = total_solve_start_time.elapsed().as_millis() as usize;
        self.state.stats.print();

        match self.state.status {
            SearchStatus::Solved => {
                let solution = self.state.solution.clone().unwrap();
                solution.log_solution(&self.graph);
                Some(solution)
            }
            _ => None,
        }
    }
}

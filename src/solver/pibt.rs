use rustc_hash::FxHashSet;
use tracing::debug;

use crate::common::{Agent, Configuration};
use crate::distance::DistanceOracle;
use crate::graph::{Graph, VertexId};

/// Produces at most one conflict-free successor of `current` under the
/// partial constraints `(agent, vertex)`. Constrained agents are placed
/// verbatim; the rest are placed greedily in descending distance-to-goal
/// order, each taking the best unclaimed vertex among staying put and its
/// neighbors. Returns `None` when the constraints collide, an agent has
/// no free move, or the placement produces a swap. No backtracking
/// happens here; alternatives are the constraint tree's job.
pub(crate) fn plan_step(
    graph: &Graph,
    oracle: &mut DistanceOracle,
    agents: &[Agent],
    current: &Configuration,
    constraints: &[(usize, VertexId)],
) -> Option<Configuration> {
    let n = agents.len();
    let mut next: Vec<Option<VertexId>> = vec![None; n];
    let mut occupied = FxHashSet::default();

    for &(who, to) in constraints {
        if !occupied.insert(to) {
            debug!("vertex conflict among constraints at {to:?}");
            return None;
        }
        next[who] = Some(to);
    }

    let mut unconstrained: Vec<usize> = (0..n).filter(|&a| next[a].is_none()).collect();
    // Farthest-from-goal agents reserve their preferred cell first; the
    // stable sort keeps ties in agent-id order.
    let distances: Vec<_> = agents
        .iter()
        .map(|agent| oracle.distance(graph, current.get(agent.id), agent.goal))
        .collect();
    unconstrained.sort_by(|&a, &b| distances[b].cmp(&distances[a]));

    for a in unconstrained {
        let u = current.get(a);
        let goal = agents[a].goal;

        if u == goal && !occupied.contains(&u) {
            occupied.insert(u);
            next[a] = Some(u);
            continue;
        }

        let mut best: Option<(usize, VertexId)> = None;
        for candidate in std::iter::once(u).chain(graph.neighbors(u).iter().copied()) {
            if occupied.contains(&candidate) {
                continue;
            }
            let dist = oracle.distance(graph, candidate, goal);
            // Strict comparison keeps the first-discovered candidate on ties.
            if best.is_none_or(|(best_dist, _)| dist < best_dist) {
                best = Some((dist, candidate));
            }
        }

        let Some((_, choice)) = best else {
            debug!("agent {a} has no free move from {u:?}");
            return None;
        };
        occupied.insert(choice);
        next[a] = Some(choice);
    }

    let next: Vec<VertexId> = next.into_iter().map(|v| v.unwrap()).collect();

    for i in 0..n {
        for j in (i + 1)..n {
            if current.get(i) == next[j] && current.get(j) == next[i] {
                debug!("swap conflict between agents {i} and {j}");
                return None;
            }
        }
    }

    Some(Configuration::new(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Graph {
        let mut graph = Graph::new();
        let ids: Vec<_> = (0..n).map(|_| graph.add_vertex()).collect();
        for pair in ids.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }
        graph
    }

    fn agents(pairs: &[(VertexId, VertexId)]) -> Vec<Agent> {
        pairs
            .iter()
            .enumerate()
            .map(|(id, &(start, goal))| Agent { id, start, goal })
            .collect()
    }

    fn assert_valid_successor(
        graph: &Graph,
        current: &Configuration,
        next: &Configuration,
        constraints: &[(usize, VertexId)],
    ) {
        let n = current.len();
        for i in 0..n {
            let u = current.get(i);
            let v = next.get(i);
            assert!(v == u || graph.has_edge(u, v), "illegal move {u} -> {v}");
            for j in (i + 1)..n {
                assert_ne!(next.get(i), next.get(j), "vertex conflict");
                assert!(
                    !(current.get(i) == next.get(j) && current.get(j) == next.get(i)),
                    "swap conflict"
                );
            }
        }
        for &(who, to) in constraints {
            assert_eq!(next.get(who), to, "constraint not honored");
        }
    }

    #[test]
    fn test_single_agent_moves_toward_goal() {
        let graph = line(5);
        let mut oracle = DistanceOracle::new();
        let agents = agents(&[(0, 4)]);
        let current = Configuration::new(vec![0]);

        let next = plan_step(&graph, &mut oracle, &agents, &current, &[]).unwrap();
        assert_eq!(next.get(0), 1);
    }

    #[test]
    fn test_agent_at_goal_commits_to_goal() {
        let graph = line(4);
        let mut oracle = DistanceOracle::new();
        let agents = agents(&[(1, 1), (2, 3)]);
        let current = Configuration::new(vec![1, 2]);

        let next = plan_step(&graph, &mut oracle, &agents, &current, &[]).unwrap();
        assert_eq!(next.get(0), 1);
        assert_eq!(next.get(1), 3);
        assert_valid_successor(&graph, &current, &next, &[]);
    }

    #[test]
    fn test_agent_yields_goal_cell_when_claimed() {
        // Agent 1 is farther from its goal and reserves vertex 1 first,
        // pushing agent 0 off its own goal for this step.
        let graph = line(3);
        let mut oracle = DistanceOracle::new();
        let agents = agents(&[(1, 1), (2, 0)]);
        let current = Configuration::new(vec![1, 2]);

        let next = plan_step(&graph, &mut oracle, &agents, &current, &[]).unwrap();
        assert_eq!(next.get(1), 1);
        assert_eq!(next.get(0), 0);
        assert_valid_successor(&graph, &current, &next, &[]);
    }

    #[test]
    fn test_constraints_are_honored() {
        let graph = line(5);
        let mut oracle = DistanceOracle::new();
        let agents = agents(&[(0, 4), (4, 0)]);
        let current = Configuration::new(vec![0, 4]);
        let constraints = [(0usize, 0usize)];

        let next = plan_step(&graph, &mut oracle, &agents, &current, &constraints).unwrap();
        assert_eq!(next.get(0), 0);
        assert_valid_successor(&graph, &current, &next, &constraints);
    }

    #[test]
    fn test_conflicting_constraints_fail() {
        let graph = line(4);
        let mut oracle = DistanceOracle::new();
        let agents = agents(&[(0, 3), (2, 0)]);
        let current = Configuration::new(vec![0, 2]);
        let constraints = [(0usize, 1usize), (1usize, 1usize)];

        assert!(plan_step(&graph, &mut oracle, &agents, &current, &constraints).is_none());
    }

    #[test]
    fn test_head_on_swap_fails() {
        let graph = line(2);
        let mut oracle = DistanceOracle::new();
        let agents = agents(&[(0, 1), (1, 0)]);
        let current = Configuration::new(vec![0, 1]);

        // The only improving moves cross the same edge in opposite
        // directions; whichever way the greedy placement lands, the
        // result is rejected.
        assert!(plan_step(&graph, &mut oracle, &agents, &current, &[]).is_none());
    }

    #[test]
    fn test_no_free_move_fails() {
        // Star with an extra arm: 0 is the hub, 1/2/3 are leaves, 4 hangs
        // off leaf 1. Constraints claim every candidate of the hub agent.
        let mut graph = Graph::new();
        for _ in 0..5 {
            graph.add_vertex();
        }
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);
        graph.add_edge(0, 3);
        graph.add_edge(1, 4);

        let mut oracle = DistanceOracle::new();
        let agents = agents(&[(0, 2), (1, 0), (2, 2), (3, 3), (4, 1)]);
        let current = Configuration::new(vec![0, 1, 2, 3, 4]);
        let constraints = [
            (1usize, 0usize),
            (2usize, 2usize),
            (3usize, 3usize),
            (4usize, 1usize),
        ];

        assert!(plan_step(&graph, &mut oracle, &agents, &current, &constraints).is_none());
    }

    #[test]
    fn test_farthest_agent_reserves_first() {
        // Two agents want the same cell; the one farther from its goal
        // claims it, the other waits.
        let mut graph = Graph::new();
        let hub = graph.add_vertex();
        let left = graph.add_vertex();
        let right = graph.add_vertex();
        let far = graph.add_vertex();
        graph.add_edge(left, hub);
        graph.add_edge(right, hub);
        graph.add_edge(hub, far);

        let mut oracle = DistanceOracle::new();
        let agents = agents(&[(left, far), (right, hub)]);
        let current = Configuration::new(vec![left, right]);

        let next = plan_step(&graph, &mut oracle, &agents, &current, &[]).unwrap();
        assert_eq!(next.get(0), hub);
        assert_eq!(next.get(1), right);
        assert_valid_successor(&graph, &current, &next, &[]);
    }
}

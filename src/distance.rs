use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use tracing::trace;

use crate::graph::{Graph, VertexId};

/// Sentinel for unreachable targets and missing endpoints.
pub const INFINITY: usize = usize::MAX;

/// On-demand BFS hop distances, memoized per unordered vertex pair.
///
/// The successor generator queries distances in its hot loop, so
/// `preload` should be called with every goal vertex up front; after
/// that the per-step queries are plain map lookups.
#[derive(Debug, Clone, Default)]
pub struct DistanceOracle {
    memo: FxHashMap<(VertexId, VertexId), usize>,
}

fn key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl DistanceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance(&mut self, graph: &Graph, from: VertexId, to: VertexId) -> usize {
        if !graph.contains(from) || !graph.contains(to) {
            return INFINITY;
        }
        if from == to {
            return 0;
        }
        if let Some(&cached) = self.memo.get(&key(from, to)) {
            return cached;
        }

        let found = self.bfs(graph, from, Some(to));
        if !found {
            // Exhausted the component without reaching the target.
            self.memo.insert(key(from, to), INFINITY);
        }
        self.memo[&key(from, to)]
    }

    /// One exhaustive BFS per source, filling the memo for every reachable
    /// vertex. Called at solver initialization with the goal vertices.
    pub fn preload(&mut self, graph: &Graph, sources: impl IntoIterator<Item = VertexId>) {
        for source in sources {
            if graph.contains(source) {
                self.bfs(graph, source, None);
            }
        }
    }

    pub fn clear(&mut self) {
        self.memo.clear();
    }

    // FIFO BFS from `source`, memoizing the distance of every settled
    // vertex. Stops early once `target` is settled, if given.
    fn bfs(&mut self, graph: &Graph, source: VertexId, target: Option<VertexId>) -> bool {
        let mut queue = VecDeque::new();
        let mut seen = FxHashMap::default();
        seen.insert(source, 0usize);
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            let dist = seen[&v];
            self.memo.insert(key(source, v), dist);
            if target == Some(v) {
                trace!("bfs {source} -> {v}: {dist}");
                return true;
            }
            for &n in graph.neighbors(v) {
                if !seen.contains_key(&n) {
                    seen.insert(n, dist + 1);
                    queue.push_back(n);
                }
            }
        }
        false
    }
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

    #[test]
    fn test_line_distances() {
        let graph = line(5);
        let mut oracle = DistanceOracle::new();

        assert_eq!(oracle.distance(&graph, 0, 0), 0);
        assert_eq!(oracle.distance(&graph, 0, 4), 4);
        assert_eq!(oracle.distance(&graph, 3, 1), 2);
    }

    #[test]
    fn test_symmetry_via_memo() {
        let graph = line(4);
        let mut oracle = DistanceOracle::new();

        assert_eq!(oracle.distance(&graph, 0, 3), 3);
        assert_eq!(oracle.distance(&graph, 3, 0), 3);
    }

    #[test]
    fn test_unreachable_and_missing() {
        let mut graph = line(2);
        let isolated = graph.add_vertex();
        let mut oracle = DistanceOracle::new();

        assert_eq!(oracle.distance(&graph, 0, isolated), INFINITY);
        assert_eq!(oracle.distance(&graph, 0, 99), INFINITY);
        // Memoized miss stays stable.
        assert_eq!(oracle.distance(&graph, isolated, 0), INFINITY);
    }

    #[test]
    fn test_preload_covers_component() {
        let graph = line(6);
        let mut oracle = DistanceOracle::new();
        oracle.preload(&graph, [5]);

        for v in 0..6 {
            assert_eq!(oracle.distance(&graph, v, 5), 5 - v);
        }
    }
}

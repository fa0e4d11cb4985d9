//! LaCAM multi-agent path finding: a depth-first search over joint
//! configurations with lazily added per-agent constraints, stepped one
//! phase at a time so callers can observe and rewind the search.

pub mod common;
pub mod config;
pub mod distance;
pub mod graph;
pub mod scenario;
pub mod solver;
pub mod stat;

pub use common::{Agent, Configuration, Solution};
pub use graph::{Graph, VertexId};
pub use solver::{LaCAM, Phase, SearchStatus, Solver};

mod comm;
mod lacam;
mod pibt;
mod state;

pub use comm::{ConstraintId, ConstraintNode, ConstraintTree, HighLevelNode};
pub use lacam::LaCAM;
pub use state::{Phase, SearchStatus};

use crate::common::Solution;

pub trait Solver {
    fn solve(&mut self) -> Option<Solution>;
}

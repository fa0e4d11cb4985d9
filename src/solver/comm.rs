mod highlevel;
mod lowlevel;

pub use highlevel::HighLevelNode;
pub use lowlevel::{ConstraintId, ConstraintNode, ConstraintTree};

pub(crate) use highlevel::{initial_priority_order, successor_priority_order};

mod decision_tree;
mod explain;
mod persistence;
mod printing;
pub mod split;
mod traversal;
pub mod tree;

pub use decision_tree::DecisionTree;
pub use split::{Branch, MissingPolicy, Split, SplitOp, Weights};
pub use tree::{Leaf, Node, Ptr, Tree};

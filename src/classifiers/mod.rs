pub mod classifier;
pub mod decision_tree;
mod explanation;
mod output_encoding;

pub use classifier::{Classifier, LabelDist};
pub use decision_tree::DecisionTree;
pub use explanation::Explanation;
pub use output_encoding::OutputEncoding;

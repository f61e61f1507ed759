mod feature_spaces;
mod trees;

pub use feature_spaces::{AGE, INCOME, OWNS_HOME, REGION, credit_feature_space};
pub use trees::{binary_tree, credit_classifier, credit_tree};

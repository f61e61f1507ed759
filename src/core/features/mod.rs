mod feature;
mod feature_set;
mod feature_space;
mod optimization_info;

pub use feature::Feature;
pub use feature_set::FeatureSet;
pub use feature_space::{FeatureSpace, NamedFeatureSpace};
pub use optimization_info::OptimizationInfo;

//! Decision tree inference, explanation and persistence.
//!
//! A [`DecisionTree`] turns a sparse [`FeatureSet`] (or, once optimized, a
//! dense `f32` array) into a label distribution, explains a label's
//! probability as a bias plus per-feature contributions, and reads and
//! writes a versioned binary record.

pub mod classifiers;
pub mod config;
pub mod core;
pub mod error;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use classifiers::decision_tree::{
    Branch, Leaf, MissingPolicy, Node, Ptr, Split, SplitOp, Tree, Weights,
};
pub use classifiers::{Classifier, DecisionTree, Explanation, LabelDist, OutputEncoding};
pub use config::TreeConfig;
pub use crate::core::features::{
    Feature, FeatureSet, FeatureSpace, NamedFeatureSpace, OptimizationInfo,
};
pub use crate::core::store::{StoreReader, StoreWriter};
pub use error::{ArborError, Result};

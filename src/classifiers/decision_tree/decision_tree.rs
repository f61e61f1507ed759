use crate::classifiers::classifier::check_label;
use crate::classifiers::decision_tree::explain::explain_recursive;
use crate::classifiers::decision_tree::traversal::{
    AccumResults, DenseFeatures, DistResults, LabelResults, SparseFeatures, predict_recursive,
};
use crate::classifiers::decision_tree::tree::{Ptr, Tree};
use crate::classifiers::{Classifier, Explanation, LabelDist, OutputEncoding};
use crate::core::features::{Feature, FeatureSet, FeatureSpace, OptimizationInfo};
use crate::error::{ArborError, Result};
use std::sync::Arc;
use tracing::debug;

/// A classifier backed by a single decision tree.
///
/// Prediction and explanation only read the tree, so a `DecisionTree` can be
/// shared between threads freely. [`DecisionTree::optimize`] needs `&mut
/// self` and must finish before the dense `optimized_*` entry points are
/// used.
#[derive(Clone)]
pub struct DecisionTree {
    pub(crate) feature_space: Arc<dyn FeatureSpace>,
    pub(crate) predicted: Option<Feature>,
    pub(crate) label_count: usize,
    pub(crate) tree: Tree,
    pub(crate) encoding: OutputEncoding,
    /// Dense array length the splits were resolved against.
    pub(crate) optimized: Option<usize>,
}

impl DecisionTree {
    pub const CLASS_ID: &'static str = "DECISION_TREE";

    pub fn new(feature_space: Arc<dyn FeatureSpace>, label_count: usize) -> Self {
        Self {
            feature_space,
            predicted: None,
            label_count,
            tree: Tree::default(),
            encoding: OutputEncoding::default(),
            optimized: None,
        }
    }

    pub fn with_predicted(mut self, predicted: Feature) -> Self {
        self.predicted = Some(predicted);
        self
    }

    pub fn with_encoding(mut self, encoding: OutputEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Installs `tree`, which must only hold distributions of `label_count`
    /// entries. Any previous optimization is dropped.
    pub fn with_tree(mut self, tree: Tree) -> Result<Self> {
        check_distributions(&tree.root, self.label_count)?;
        self.tree = tree;
        self.optimized = None;
        Ok(self)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn predict(&self, features: &FeatureSet) -> LabelDist {
        let mut results = DistResults::new(self.label_count);
        predict_recursive(&SparseFeatures(features), &mut results, &self.tree.root, 1.0);
        results.result()
    }

    pub fn predict_label(&self, label: usize, features: &FeatureSet) -> Result<f32> {
        check_label(label, self.label_count)?;
        let mut results = LabelResults::new(label);
        predict_recursive(&SparseFeatures(features), &mut results, &self.tree.root, 1.0);
        Ok(results.result())
    }

    /// Adds `weight` times this tree's distribution into `accum`, the way an
    /// ensemble sums its members.
    pub fn predict_accumulate(
        &self,
        features: &FeatureSet,
        weight: f64,
        accum: &mut [f64],
    ) -> Result<()> {
        let accum = self.accum_slice(accum)?;
        let mut results = AccumResults::new(accum, weight);
        predict_recursive(&SparseFeatures(features), &mut results, &self.tree.root, 1.0);
        Ok(())
    }

    pub fn optimization_supported(&self) -> bool {
        true
    }

    pub fn predict_is_optimized(&self) -> bool {
        self.optimized.is_some()
    }

    /// Resolves every split's feature to its offset in `info`. Running it
    /// again, with the same or another layout, simply re-resolves.
    pub fn optimize(&mut self, info: &OptimizationInfo) -> Result<()> {
        if let Some(feature) = self
            .all_features()
            .into_iter()
            .find(|&f| info.index_of(f).is_none())
        {
            return Err(ArborError::InvalidArgument(format!(
                "feature {} is not in the optimization info",
                self.feature_space.print_feature(feature)
            )));
        }
        optimize_recursive(info, &mut self.tree.root)?;
        self.optimized = Some(info.len());
        debug!(
            nodes = self.tree.node_count(),
            dense_len = info.len(),
            "optimized decision tree"
        );
        Ok(())
    }

    pub fn optimized_predict(&self, features: &[f32]) -> Result<LabelDist> {
        self.check_dense(features)?;
        let mut results = DistResults::new(self.label_count);
        predict_recursive(&DenseFeatures(features), &mut results, &self.tree.root, 1.0);
        Ok(results.result())
    }

    pub fn optimized_predict_label(&self, label: usize, features: &[f32]) -> Result<f32> {
        check_label(label, self.label_count)?;
        self.check_dense(features)?;
        let mut results = LabelResults::new(label);
        predict_recursive(&DenseFeatures(features), &mut results, &self.tree.root, 1.0);
        Ok(results.result())
    }

    pub fn optimized_predict_accumulate(
        &self,
        features: &[f32],
        weight: f64,
        accum: &mut [f64],
    ) -> Result<()> {
        self.check_dense(features)?;
        let accum = self.accum_slice(accum)?;
        let mut results = AccumResults::new(accum, weight);
        predict_recursive(&DenseFeatures(features), &mut results, &self.tree.root, 1.0);
        Ok(())
    }

    pub fn explain(
        &self,
        features: &FeatureSet,
        label: usize,
        weight: f64,
    ) -> Result<Explanation> {
        check_label(label, self.label_count)?;
        let mut explanation = Explanation::new(label);
        explain_recursive(
            &SparseFeatures(features),
            &mut explanation,
            weight,
            &self.tree.root,
            None,
        );
        Ok(explanation)
    }

    pub fn all_features(&self) -> Vec<Feature> {
        let mut result = Vec::new();
        all_features_recursive(&self.tree.root, &mut result);
        result.sort_unstable();
        result.dedup();
        result
    }

    fn check_dense(&self, features: &[f32]) -> Result<()> {
        let Some(len) = self.optimized else {
            return Err(ArborError::NotOptimized);
        };
        if features.len() != len {
            return Err(ArborError::InvalidArgument(format!(
                "dense feature array has {} entries, expected {len}",
                features.len()
            )));
        }
        Ok(())
    }

    fn accum_slice<'a>(&self, accum: &'a mut [f64]) -> Result<&'a mut [f64]> {
        if accum.len() < self.label_count {
            return Err(ArborError::InvalidArgument(format!(
                "accumulator has {} entries, expected {}",
                accum.len(),
                self.label_count
            )));
        }
        Ok(&mut accum[..self.label_count])
    }
}

impl Classifier for DecisionTree {
    fn class_id(&self) -> &'static str {
        Self::CLASS_ID
    }

    fn label_count(&self) -> usize {
        self.label_count
    }

    fn feature_space(&self) -> &Arc<dyn FeatureSpace> {
        &self.feature_space
    }

    fn predicted(&self) -> Option<Feature> {
        self.predicted
    }

    fn output_encoding(&self) -> OutputEncoding {
        self.encoding
    }

    fn predict(&self, features: &FeatureSet) -> LabelDist {
        DecisionTree::predict(self, features)
    }

    fn predict_label(&self, label: usize, features: &FeatureSet) -> Result<f32> {
        DecisionTree::predict_label(self, label, features)
    }

    fn explain(&self, features: &FeatureSet, label: usize, weight: f64) -> Result<Explanation> {
        DecisionTree::explain(self, features, label, weight)
    }

    fn all_features(&self) -> Vec<Feature> {
        DecisionTree::all_features(self)
    }
}

fn optimize_recursive(info: &OptimizationInfo, ptr: &mut Ptr) -> Result<()> {
    let Ptr::Node(node) = ptr else {
        return Ok(());
    };
    node.split.optimize(info)?;
    optimize_recursive(info, &mut node.child_true)?;
    optimize_recursive(info, &mut node.child_false)?;
    optimize_recursive(info, &mut node.child_missing)
}

fn all_features_recursive(ptr: &Ptr, result: &mut Vec<Feature>) {
    if let Ptr::Node(node) = ptr {
        result.push(node.split.feature());
        all_features_recursive(&node.child_true, result);
        all_features_recursive(&node.child_false, result);
        all_features_recursive(&node.child_missing, result);
    }
}

pub(crate) fn check_distributions(ptr: &Ptr, label_count: usize) -> Result<()> {
    if let Some(pred) = ptr.pred() {
        if pred.len() != label_count {
            return Err(ArborError::InvalidArgument(format!(
                "distribution has {} entries, expected {label_count}",
                pred.len()
            )));
        }
    }
    if let Ptr::Node(node) = ptr {
        check_distributions(&node.child_true, label_count)?;
        check_distributions(&node.child_false, label_count)?;
        check_distributions(&node.child_missing, label_count)?;
    }
    Ok(())
}

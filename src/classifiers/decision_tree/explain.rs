use crate::classifiers::Explanation;
use crate::classifiers::decision_tree::split::Branch;
use crate::classifiers::decision_tree::traversal::GetFeatures;
use crate::classifiers::decision_tree::tree::{Node, Ptr};
use strum::IntoEnumIterator;

/// Attributes `weight * pred[label]` at the root to the bias, and every
/// change in `pred[label]` between a node and its parent to the parent's
/// split feature. Summed over a path the changes telescope back to the
/// leaf value, so the explanation adds up to the prediction. An empty
/// child reached with positive weight records nothing, so its share of the
/// parent's value stays in the explanation while prediction drops it.
///
/// Every distribution has `label_count` entries (checked by `with_tree` and
/// on read) and `label` is checked by the caller.
pub(crate) fn explain_recursive<G: GetFeatures>(
    get_features: &G,
    explanation: &mut Explanation,
    weight: f64,
    ptr: &Ptr,
    parent: Option<&Node>,
) {
    let Some(pred) = ptr.pred() else {
        return;
    };
    let label = explanation.label;
    let here = pred[label] as f64;

    match parent {
        None => explanation.bias += weight * here,
        Some(parent) => {
            let before = parent.pred[label] as f64;
            explanation.add_feature_weight(parent.split.feature(), weight * (here - before));
        }
    }

    let Ptr::Node(node) = ptr else {
        return;
    };

    let weights = get_features.weights(&node.split);

    for branch in Branch::iter() {
        if weights[branch] > 0.0 {
            explain_recursive(
                get_features,
                explanation,
                weight * weights[branch] as f64,
                node.child(branch),
                Some(node),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::decision_tree::split::{MissingPolicy, Split, SplitOp};
    use crate::classifiers::decision_tree::traversal::{
        LabelResults, SparseFeatures, predict_recursive,
    };
    use crate::core::features::{Feature, FeatureSet};

    fn two_level() -> Ptr {
        let inner = Node::new(
            Split::new(Feature(1), SplitOp::Equal(1.0)),
            vec![0.4, 0.6],
            5.0,
            0.5,
        )
        .with_child(Branch::True, Ptr::leaf(vec![0.1, 0.9], 2.0))
        .with_child(Branch::False, Ptr::leaf(vec![0.6, 0.4], 3.0))
        .with_child(Branch::Missing, Ptr::leaf(vec![0.4, 0.6], 0.0));
        Ptr::node(
            Node::new(
                Split::new(Feature(0), SplitOp::LessThan(10.0))
                    .with_missing_policy(MissingPolicy::Distribute { true_fraction: 0.5 }),
                vec![0.5, 0.5],
                10.0,
                2.0,
            )
            .with_child(Branch::True, Ptr::node(inner))
            .with_child(Branch::False, Ptr::leaf(vec![0.8, 0.2], 5.0)),
        )
    }

    #[test]
    fn attributes_changes_to_parent_features() {
        let tree = two_level();
        let features: FeatureSet = [(Feature(0), 3.0), (Feature(1), 1.0)].into_iter().collect();
        let mut explanation = Explanation::new(1);
        explain_recursive(&SparseFeatures(&features), &mut explanation, 1.0, &tree, None);

        assert!((explanation.bias - 0.5).abs() < 1e-6);
        assert!((explanation.feature_weights[&Feature(0)] - 0.1).abs() < 1e-6);
        assert!((explanation.feature_weights[&Feature(1)] - 0.3).abs() < 1e-6);
        assert!((explanation.total() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn shared_weight_is_split_across_branches() {
        let tree = two_level();
        let features: FeatureSet = [(Feature(1), 0.0)].into_iter().collect();
        let mut explanation = Explanation::new(0);
        explain_recursive(&SparseFeatures(&features), &mut explanation, 2.0, &tree, None);

        // Half reaches the inner node then the false leaf (0.6), half the 0.8 leaf.
        assert!((explanation.total() - 2.0 * (0.5 * 0.6 + 0.5 * 0.8)).abs() < 1e-6);
        assert_eq!(explanation.feature_weights.len(), 2);
    }

    #[test]
    fn leaf_root_is_all_bias() {
        let tree = Ptr::leaf(vec![0.3, 0.7], 1.0);
        let mut explanation = Explanation::new(1);
        explain_recursive(&SparseFeatures(&FeatureSet::new()), &mut explanation, 1.0, &tree, None);
        assert!((explanation.bias - 0.7).abs() < 1e-6);
        assert!(explanation.feature_weights.is_empty());
    }

    #[test]
    fn empty_child_keeps_parent_value_in_explanation() {
        let tree = Ptr::node(
            Node::new(
                Split::new(Feature(0), SplitOp::LessThan(1.0))
                    .with_missing_policy(MissingPolicy::Distribute { true_fraction: 0.5 }),
                vec![0.4, 0.6],
                10.0,
                1.0,
            )
            .with_child(Branch::True, Ptr::leaf(vec![0.2, 0.8], 5.0)),
        );
        let features = FeatureSet::new();

        let mut prediction = LabelResults::new(1);
        predict_recursive(&SparseFeatures(&features), &mut prediction, &tree, 1.0);
        assert!((prediction.result() - 0.4).abs() < 1e-6);

        let mut explanation = Explanation::new(1);
        explain_recursive(&SparseFeatures(&features), &mut explanation, 1.0, &tree, None);
        // The false half reaches an empty child: 0.5 * 0.6 is never taken back out.
        assert!((explanation.total() - (0.4 + 0.5 * 0.6)).abs() < 1e-6);
        assert!((explanation.feature_weights[&Feature(0)] - 0.5 * (0.8 - 0.6)).abs() < 1e-6);
    }
}

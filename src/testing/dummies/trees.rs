use super::{AGE, INCOME, OWNS_HOME, REGION, credit_feature_space};
use crate::classifiers::decision_tree::{
    Branch, DecisionTree, MissingPolicy, Node, Ptr, Split, SplitOp, Tree,
};
use crate::core::features::Feature;

/// Three-label tree of depth four mixing every split op and missing policy.
///
/// ```text
/// age < 30                         [missing -> branch]
///   true:  income < 50000          [missing -> 30% true]
///            true:  leaf
///            false: owns_home present
///                     true:  leaf
///                     false: leaf
///   false: region = 2              [missing -> branch]
///            true / false / missing: leaves
///   missing: leaf
/// ```
pub fn credit_tree() -> Tree {
    let owns_home = Node::new(
        Split::new(OWNS_HOME, SplitOp::Presence),
        vec![0.26, 0.54, 0.2],
        15.0,
        0.9,
    )
    .with_child(Branch::True, Ptr::leaf(vec![0.1, 0.7, 0.2], 9.0))
    .with_child(Branch::False, Ptr::leaf(vec![0.5, 0.3, 0.2], 6.0));

    let income = Node::new(
        Split::new(INCOME, SplitOp::LessThan(50_000.0))
            .with_missing_policy(MissingPolicy::Distribute { true_fraction: 0.3 }),
        vec![0.6, 0.3, 0.1],
        40.0,
        1.2,
    )
    .with_child(Branch::True, Ptr::leaf(vec![0.8, 0.15, 0.05], 25.0))
    .with_child(Branch::False, Ptr::node(owns_home));

    let region = Node::new(
        Split::new(REGION, SplitOp::Equal(2.0)),
        vec![0.3, 0.38, 0.32],
        50.0,
        0.8,
    )
    .with_child(Branch::True, Ptr::leaf(vec![0.1, 0.2, 0.7], 20.0))
    .with_child(Branch::False, Ptr::leaf(vec![0.45, 0.5, 0.05], 25.0))
    .with_child(Branch::Missing, Ptr::leaf(vec![0.3, 0.4, 0.3], 5.0));

    let root = Node::new(
        Split::new(AGE, SplitOp::LessThan(30.0)),
        vec![0.4, 0.35, 0.25],
        100.0,
        2.5,
    )
    .with_child(Branch::True, Ptr::node(income))
    .with_child(Branch::False, Ptr::node(region))
    .with_child(Branch::Missing, Ptr::leaf(vec![0.34, 0.33, 0.33], 10.0));

    Tree::new(Ptr::node(root))
}

pub fn credit_classifier() -> DecisionTree {
    DecisionTree::new(credit_feature_space(), 3)
        .with_predicted(Feature(4))
        .with_tree(credit_tree())
        .expect("fixture distributions have three labels")
}

/// Two-label tree; exercises the two-label accumulation path.
pub fn binary_tree() -> Tree {
    let inner = Node::new(
        Split::new(INCOME, SplitOp::LessThan(20_000.0))
            .with_missing_policy(MissingPolicy::Distribute { true_fraction: 0.5 }),
        vec![0.7, 0.3],
        30.0,
        1.1,
    )
    .with_child(Branch::True, Ptr::leaf(vec![0.9, 0.1], 12.0))
    .with_child(Branch::False, Ptr::leaf(vec![0.55, 0.45], 18.0));

    let root = Node::new(
        Split::new(AGE, SplitOp::LessThan(40.0)),
        vec![0.5, 0.5],
        60.0,
        3.0,
    )
    .with_child(Branch::True, Ptr::node(inner))
    .with_child(Branch::False, Ptr::leaf(vec![0.3, 0.7], 30.0))
    .with_child(Branch::Missing, Ptr::leaf(vec![0.5, 0.5], 0.0));

    Tree::new(Ptr::node(root))
}

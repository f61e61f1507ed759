use crate::classifiers::decision_tree::DecisionTree;
use crate::classifiers::decision_tree::split::Branch;
use crate::classifiers::decision_tree::tree::Ptr;
use strum::IntoEnumIterator;

impl DecisionTree {
    /// Multi-line dump of the whole tree. Each node shows its split, the
    /// quality statistic divided by the node's coverage, its training weight
    /// and the share of the root's weight that reached it.
    pub fn print(&self) -> String {
        let mut result = String::from("Decision tree:\n");
        let total_weight = self.tree.root.examples().unwrap_or(0.0);
        self.print_recursive(&mut result, 0, &self.tree.root, total_weight);
        result
    }

    fn print_recursive(&self, out: &mut String, level: usize, ptr: &Ptr, total_weight: f32) {
        let spaces = " ".repeat(level * 4);
        match ptr {
            Ptr::Node(node) => {
                let cov = coverage(node.examples, total_weight);
                out.push_str(&format!(
                    "{spaces} {} (z = {:.4}, weight = {:.2}, cov = {:.2}%)\n",
                    node.split.print(self.feature_space.as_ref()),
                    adjusted_z(node.z, cov),
                    node.examples,
                    cov * 100.0
                ));
                for branch in Branch::iter() {
                    out.push_str(&format!("{spaces}  {branch}: \n"));
                    self.print_recursive(out, level + 1, node.child(branch), total_weight);
                }
            }
            Ptr::Leaf(leaf) => {
                let cov = coverage(leaf.examples, total_weight);
                out.push_str(&format!(
                    "{spaces}leaf: {} (weight = {:.2}, cov = {:.2}%)\n\n",
                    print_dist(&leaf.pred),
                    leaf.examples,
                    cov * 100.0
                ));
            }
            Ptr::Empty => out.push_str(&format!("{spaces}NULL\n")),
        }
    }

    /// One-line description of the root.
    pub fn summary(&self) -> String {
        match &self.tree.root {
            Ptr::Empty => "NULL".to_string(),
            Ptr::Node(node) => format!(
                "Root: {} (z = {:.4})",
                node.split.print(self.feature_space.as_ref()),
                node.z
            ),
            Ptr::Leaf(leaf) => format!("leaf: {}", print_dist(&leaf.pred)),
        }
    }
}

fn coverage(examples: f32, total_weight: f32) -> f32 {
    if total_weight > 0.0 {
        examples / total_weight
    } else {
        0.0
    }
}

fn adjusted_z(z: f32, cov: f32) -> f32 {
    if cov > 0.0 { z / cov } else { z }
}

/// Non-zero entries as `label/probability` pairs.
fn print_dist(dist: &[f32]) -> String {
    dist.iter()
        .enumerate()
        .filter(|(_, p)| **p != 0.0)
        .map(|(i, p)| format!(" {i}/{p:.3}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::decision_tree::split::{Split, SplitOp};
    use crate::classifiers::decision_tree::tree::{Node, Tree};
    use crate::core::features::{Feature, NamedFeatureSpace};
    use std::sync::Arc;

    fn classifier(root: Ptr) -> DecisionTree {
        let fs = Arc::new(NamedFeatureSpace::new(["age", "income"]));
        DecisionTree::new(fs, 2)
            .with_tree(Tree::new(root))
            .unwrap()
    }

    fn stump() -> Ptr {
        Ptr::node(
            Node::new(
                Split::new(Feature(0), SplitOp::LessThan(30.0)),
                vec![0.5, 0.5],
                8.0,
                1.5,
            )
            .with_child(Branch::True, Ptr::leaf(vec![1.0, 0.0], 2.0))
            .with_child(Branch::False, Ptr::leaf(vec![0.25, 0.75], 6.0)),
        )
    }

    #[test]
    fn print_shows_every_branch() {
        let text = classifier(stump()).print();
        assert!(text.starts_with("Decision tree:\n"));
        assert!(text.contains(" age < 30 (z = 1.5000, weight = 8.00, cov = 100.00%)"));
        assert!(text.contains("  true: \n"));
        assert!(text.contains("    leaf:  0/1.000 (weight = 2.00, cov = 25.00%)"));
        assert!(text.contains("    leaf:  0/0.250 1/0.750 (weight = 6.00, cov = 75.00%)"));
        assert!(text.contains("  missing: \n    NULL\n"));
    }

    #[test]
    fn summary_describes_root() {
        assert_eq!(classifier(stump()).summary(), "Root: age < 30 (z = 1.5000)");
        assert_eq!(classifier(Ptr::Empty).summary(), "NULL");
        assert_eq!(
            classifier(Ptr::leaf(vec![0.0, 1.0], 3.0)).summary(),
            "leaf:  1/1.000"
        );
    }

    #[test]
    fn zero_weight_tree_prints_without_nan() {
        let text = classifier(Ptr::leaf(vec![0.5, 0.5], 0.0)).print();
        assert!(!text.contains("NaN"));
        assert!(text.contains("cov = 0.00%"));
    }
}

use crate::core::features::{Feature, FeatureSpace};
use crate::error::{ArborError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Decomposition of one predicted label probability into a bias term and
/// additive per-feature contributions.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Explanation {
    pub label: usize,
    pub bias: f64,
    pub feature_weights: BTreeMap<Feature, f64>,
}

impl Explanation {
    pub fn new(label: usize) -> Self {
        Self {
            label,
            bias: 0.0,
            feature_weights: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn add_feature_weight(&mut self, feature: Feature, weight: f64) {
        *self.feature_weights.entry(feature).or_insert(0.0) += weight;
    }

    /// Bias plus every feature contribution.
    pub fn total(&self) -> f64 {
        self.bias + self.feature_weights.values().sum::<f64>()
    }

    /// Folds `other`, scaled by `weight`, into this explanation. Used to
    /// combine the explanations of several classifiers.
    pub fn add(&mut self, other: &Explanation, weight: f64) -> Result<()> {
        if other.label != self.label {
            return Err(ArborError::InvalidArgument(format!(
                "cannot combine explanations of labels {} and {}",
                self.label, other.label
            )));
        }
        self.bias += weight * other.bias;
        for (&feature, &w) in &other.feature_weights {
            self.add_feature_weight(feature, weight * w);
        }
        Ok(())
    }

    /// Contributions sorted by decreasing magnitude; ties keep feature order.
    pub fn ranked(&self) -> Vec<(Feature, f64)> {
        let mut ranked: Vec<_> = self
            .feature_weights
            .iter()
            .map(|(&f, &w)| (f, w))
            .collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        ranked
    }

    /// Renders the bias and the `max_features` largest contributions.
    pub fn print(&self, feature_space: &dyn FeatureSpace, max_features: usize) -> String {
        let mut result = format!("{:>10.4} (bias)\n", self.bias);
        for (feature, weight) in self.ranked().into_iter().take(max_features) {
            result += &format!("{:>10.4} {}\n", weight, feature_space.print_feature(feature));
        }
        result += &format!("{:>10.4} (total)\n", self.total());
        result
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

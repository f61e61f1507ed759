use crate::classifiers::{Explanation, OutputEncoding};
use crate::core::features::{Feature, FeatureSet, FeatureSpace};
use crate::error::{ArborError, Result};
use std::sync::Arc;

/// Per-label probabilities; entries of a leaf distribution sum to one.
pub type LabelDist = Vec<f32>;

pub trait Classifier: Send + Sync {
    fn class_id(&self) -> &'static str;

    fn label_count(&self) -> usize;

    fn feature_space(&self) -> &Arc<dyn FeatureSpace>;

    fn predicted(&self) -> Option<Feature>;

    fn output_encoding(&self) -> OutputEncoding;

    fn predict(&self, features: &FeatureSet) -> LabelDist;

    fn predict_label(&self, label: usize, features: &FeatureSet) -> Result<f32> {
        check_label(label, self.label_count())?;
        Ok(self.predict(features)[label])
    }

    /// Label with the highest predicted value; the lowest index wins ties.
    fn predict_highest(&self, features: &FeatureSet) -> Option<usize> {
        argmax(&self.predict(features))
    }

    fn explain(&self, features: &FeatureSet, label: usize, weight: f64) -> Result<Explanation>;

    /// Every feature the classifier looks at, sorted and without duplicates.
    fn all_features(&self) -> Vec<Feature>;
}

pub(crate) fn check_label(label: usize, label_count: usize) -> Result<()> {
    if label >= label_count {
        return Err(ArborError::InvalidArgument(format!(
            "label {label} out of range for {label_count} labels"
        )));
    }
    Ok(())
}

#[inline]
fn argmax(v: &[f32]) -> Option<usize> {
    let mut best = None;
    let mut best_value = f32::NEG_INFINITY;
    for (i, &x) in v.iter().enumerate() {
        if !x.is_finite() {
            continue;
        }
        if best.is_none() || x > best_value {
            best = Some(i);
            best_value = x;
        }
    }
    best
}

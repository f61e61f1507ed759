use crate::core::features::{Feature, FeatureSet, FeatureSpace};
use std::collections::HashMap;

/// Maps features to offsets in a dense `f32` feature array.
#[derive(Clone, Debug, Default)]
pub struct OptimizationInfo {
    indexes: HashMap<Feature, usize>,
    len: usize,
}

impl OptimizationInfo {
    /// Lays out `features` in iteration order; duplicates keep their first slot.
    pub fn from_features<I: IntoIterator<Item = Feature>>(features: I) -> Self {
        let mut indexes = HashMap::new();
        for feature in features {
            let next = indexes.len();
            indexes.entry(feature).or_insert(next);
        }
        let len = indexes.len();
        Self { indexes, len }
    }

    pub fn from_feature_space(feature_space: &dyn FeatureSpace) -> Self {
        Self::from_features(feature_space.features())
    }

    pub fn index_of(&self, feature: Feature) -> Option<usize> {
        self.indexes.get(&feature).copied()
    }

    /// Number of slots a dense feature array must have.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Builds the dense array for `features`; missing slots hold `NaN`.
    /// Features outside this layout are dropped.
    pub fn to_dense(&self, features: &FeatureSet) -> Vec<f32> {
        let mut dense = vec![f32::NAN; self.len];
        for (feature, value) in features.iter() {
            if let Some(index) = self.index_of(feature) {
                dense[index] = value;
            }
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::NamedFeatureSpace;

    #[test]
    fn assigns_slots_in_order_and_skips_duplicates() {
        let info = OptimizationInfo::from_features([Feature(5), Feature(2), Feature(5)]);
        assert_eq!(info.len(), 2);
        assert_eq!(info.index_of(Feature(5)), Some(0));
        assert_eq!(info.index_of(Feature(2)), Some(1));
        assert_eq!(info.index_of(Feature(3)), None);
    }

    #[test]
    fn dense_array_marks_missing_as_nan() {
        let fs = NamedFeatureSpace::new(["x", "y", "z"]);
        let info = OptimizationInfo::from_feature_space(&fs);
        let set: FeatureSet = [(Feature(2), 4.0), (Feature(0), 1.0)].into_iter().collect();

        let dense = info.to_dense(&set);
        assert_eq!(dense[0], 1.0);
        assert!(dense[1].is_nan());
        assert_eq!(dense[2], 4.0);
    }
}

use crate::core::features::Feature;

/// Sparse feature vector, kept sorted by feature.
///
/// A feature that has no entry, or whose value is `NaN`, is missing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureSet {
    entries: Vec<(Feature, f32)>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `feature` to `value`, replacing any previous value.
    pub fn insert(&mut self, feature: Feature, value: f32) {
        match self.entries.binary_search_by_key(&feature, |(f, _)| *f) {
            Ok(pos) => self.entries[pos].1 = value,
            Err(pos) => self.entries.insert(pos, (feature, value)),
        }
    }

    pub fn remove(&mut self, feature: Feature) -> Option<f32> {
        let pos = self
            .entries
            .binary_search_by_key(&feature, |(f, _)| *f)
            .ok()?;
        Some(self.entries.remove(pos).1)
    }

    pub fn get(&self, feature: Feature) -> Option<f32> {
        self.entries
            .binary_search_by_key(&feature, |(f, _)| *f)
            .ok()
            .map(|pos| self.entries[pos].1)
            .filter(|v| !v.is_nan())
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.get(feature).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f32)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Feature, f32)> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = (Feature, f32)>>(iter: I) -> Self {
        let mut set = FeatureSet::new();
        for (feature, value) in iter {
            set.insert(feature, value);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_entries_sorted_and_replaces() {
        let mut set = FeatureSet::new();
        set.insert(Feature(3), 1.0);
        set.insert(Feature(1), 2.0);
        set.insert(Feature(3), 5.0);

        let collected: Vec<_> = set.iter().collect();
        assert_eq!(collected, vec![(Feature(1), 2.0), (Feature(3), 5.0)]);
    }

    #[test]
    fn nan_and_absent_values_are_missing() {
        let set: FeatureSet = [(Feature(0), f32::NAN), (Feature(2), 0.5)]
            .into_iter()
            .collect();
        assert_eq!(set.get(Feature(0)), None);
        assert_eq!(set.get(Feature(1)), None);
        assert_eq!(set.get(Feature(2)), Some(0.5));
        assert!(!set.contains(Feature(0)));
    }

    #[test]
    fn remove_returns_previous_value() {
        let mut set: FeatureSet = [(Feature(4), 1.5)].into_iter().collect();
        assert_eq!(set.remove(Feature(4)), Some(1.5));
        assert_eq!(set.remove(Feature(4)), None);
        assert!(set.is_empty());
    }
}

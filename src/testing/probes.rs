use crate::core::features::FeatureSet;
use crate::testing::dummies::{AGE, INCOME, OWNS_HOME, REGION};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random feature vectors over the credit feature space. With
/// `missing_rate` above zero, each feature is independently left out.
pub fn credit_probes(seed: u64, count: usize, missing_rate: f64) -> Vec<FeatureSet> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let mut set = FeatureSet::new();
            if !rng.random_bool(missing_rate) {
                set.insert(AGE, rng.random_range(18..80) as f32);
            }
            if !rng.random_bool(missing_rate) {
                set.insert(INCOME, rng.random_range(0.0..120_000.0));
            }
            if !rng.random_bool(missing_rate) {
                set.insert(OWNS_HOME, 1.0);
            }
            if !rng.random_bool(missing_rate) {
                set.insert(REGION, rng.random_range(0..4) as f32);
            }
            set
        })
        .collect()
}

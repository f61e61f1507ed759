use crate::core::features::{Feature, NamedFeatureSpace};
use std::sync::Arc;

pub const AGE: Feature = Feature(0);
pub const INCOME: Feature = Feature(1);
pub const OWNS_HOME: Feature = Feature(2);
pub const REGION: Feature = Feature(3);

pub fn credit_feature_space() -> Arc<NamedFeatureSpace> {
    Arc::new(NamedFeatureSpace::new([
        "age",
        "income",
        "owns_home",
        "region",
        "unused",
    ]))
}

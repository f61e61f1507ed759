use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an input feature inside a [`super::FeatureSpace`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Feature(pub u32);

impl Feature {
    #[inline]
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

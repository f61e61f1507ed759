use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, FromRepr};

/// How a classifier's outputs should be read.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
    EnumString,
    FromRepr,
)]
#[repr(u8)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OutputEncoding {
    /// Outputs are label probabilities in `[0, 1]`.
    #[default]
    Probability = 0,
    /// Outputs are unbounded scores.
    PlusMinusInfinity = 1,
    /// Outputs are scores in `[-1, 1]`.
    PlusMinusOne = 2,
}

impl OutputEncoding {
    pub fn tag(self) -> u64 {
        self as u8 as u64
    }

    pub fn from_tag(tag: u64) -> Option<Self> {
        u8::try_from(tag).ok().and_then(Self::from_repr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn tags_round_trip() {
        for encoding in OutputEncoding::iter() {
            assert_eq!(OutputEncoding::from_tag(encoding.tag()), Some(encoding));
        }
        assert_eq!(OutputEncoding::from_tag(3), None);
        assert_eq!(OutputEncoding::from_tag(u64::MAX), None);
    }

    #[test]
    fn parses_kebab_case_names() {
        assert_eq!(
            OutputEncoding::from_str("plus-minus-one").unwrap(),
            OutputEncoding::PlusMinusOne
        );
        assert_eq!(OutputEncoding::Probability.to_string(), "probability");
    }
}

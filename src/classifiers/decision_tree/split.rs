use crate::core::features::{Feature, FeatureSet, FeatureSpace, OptimizationInfo};
use crate::core::store::{StoreReader, StoreWriter};
use crate::error::{ArborError, Result};
use std::io::{Read, Write};
use std::ops::Index;
use strum_macros::{Display, EnumIter};

/// The three ways out of a tree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Branch {
    True,
    False,
    Missing,
}

/// Fraction of an example routed down each branch of a split.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weights {
    pub true_weight: f32,
    pub false_weight: f32,
    pub missing_weight: f32,
}

impl Weights {
    pub const TRUE: Weights = Weights::new(1.0, 0.0, 0.0);
    pub const FALSE: Weights = Weights::new(0.0, 1.0, 0.0);
    pub const MISSING: Weights = Weights::new(0.0, 0.0, 1.0);

    pub const fn new(true_weight: f32, false_weight: f32, missing_weight: f32) -> Self {
        Self {
            true_weight,
            false_weight,
            missing_weight,
        }
    }

    pub fn total(&self) -> f32 {
        self.true_weight + self.false_weight + self.missing_weight
    }
}

impl Index<Branch> for Weights {
    type Output = f32;

    fn index(&self, branch: Branch) -> &f32 {
        match branch {
            Branch::True => &self.true_weight,
            Branch::False => &self.false_weight,
            Branch::Missing => &self.missing_weight,
        }
    }
}

/// The predicate a split applies to its feature's value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SplitOp {
    /// True when the value is strictly below the threshold.
    LessThan(f32),
    /// True when the value equals the operand.
    Equal(f32),
    /// True when the feature has a value at all. Never missing.
    Presence,
}

impl SplitOp {
    fn tag(&self) -> u64 {
        match self {
            SplitOp::LessThan(_) => 0,
            SplitOp::Equal(_) => 1,
            SplitOp::Presence => 2,
        }
    }

    fn operand(&self) -> f32 {
        match self {
            SplitOp::LessThan(v) | SplitOp::Equal(v) => *v,
            SplitOp::Presence => 0.0,
        }
    }

    fn from_parts(tag: u64, operand: f32) -> Result<Self> {
        match tag {
            0 => Ok(SplitOp::LessThan(operand)),
            1 => Ok(SplitOp::Equal(operand)),
            2 => Ok(SplitOp::Presence),
            other => Err(ArborError::Malformed(format!("unknown split op {other}"))),
        }
    }
}

/// Where an example goes when the split's feature has no value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MissingPolicy {
    /// All of the example follows the missing branch.
    #[default]
    Branch,
    /// The example is shared between the true and false branches;
    /// `true_fraction` is clamped to `[0, 1]`.
    Distribute { true_fraction: f32 },
}

impl MissingPolicy {
    fn weights(&self) -> Weights {
        match *self {
            MissingPolicy::Branch => Weights::MISSING,
            MissingPolicy::Distribute { true_fraction } => {
                let p = if true_fraction.is_nan() {
                    0.5
                } else {
                    true_fraction.clamp(0.0, 1.0)
                };
                Weights::new(p, 1.0 - p, 0.0)
            }
        }
    }

    fn tag(&self) -> u64 {
        match self {
            MissingPolicy::Branch => 0,
            MissingPolicy::Distribute { .. } => 1,
        }
    }

    fn operand(&self) -> f32 {
        match self {
            MissingPolicy::Branch => 0.0,
            MissingPolicy::Distribute { true_fraction } => *true_fraction,
        }
    }

    fn from_parts(tag: u64, operand: f32) -> Result<Self> {
        match tag {
            0 => Ok(MissingPolicy::Branch),
            1 => Ok(MissingPolicy::Distribute {
                true_fraction: operand,
            }),
            other => Err(ArborError::Malformed(format!(
                "unknown missing policy {other}"
            ))),
        }
    }
}

/// Decision rule bound to one feature.
#[derive(Clone, Debug, PartialEq)]
pub struct Split {
    feature: Feature,
    op: SplitOp,
    missing: MissingPolicy,
    dense_index: Option<usize>,
}

impl Split {
    pub fn new(feature: Feature, op: SplitOp) -> Self {
        Self {
            feature,
            op,
            missing: MissingPolicy::default(),
            dense_index: None,
        }
    }

    pub fn with_missing_policy(mut self, missing: MissingPolicy) -> Self {
        self.missing = missing;
        self
    }

    pub fn feature(&self) -> Feature {
        self.feature
    }

    pub fn op(&self) -> SplitOp {
        self.op
    }

    pub fn missing_policy(&self) -> MissingPolicy {
        self.missing
    }

    /// Dense array offset resolved by [`Split::optimize`].
    pub fn dense_index(&self) -> Option<usize> {
        self.dense_index
    }

    #[inline]
    fn weights_for(&self, value: Option<f32>) -> Weights {
        let value = match value {
            Some(v) if !v.is_nan() => v,
            _ => {
                return match self.op {
                    SplitOp::Presence => Weights::FALSE,
                    _ => self.missing.weights(),
                };
            }
        };
        let passes = match self.op {
            SplitOp::LessThan(threshold) => value < threshold,
            SplitOp::Equal(operand) => value == operand,
            SplitOp::Presence => true,
        };
        if passes { Weights::TRUE } else { Weights::FALSE }
    }

    #[inline]
    pub fn apply(&self, features: &FeatureSet) -> Weights {
        self.weights_for(features.get(self.feature))
    }

    /// Evaluates against a dense array. An unresolved split, or an offset
    /// past the end of the array, sees the feature as missing.
    #[inline]
    pub fn apply_dense(&self, features: &[f32]) -> Weights {
        let value = self.dense_index.and_then(|i| features.get(i)).copied();
        self.weights_for(value)
    }

    pub fn optimize(&mut self, info: &OptimizationInfo) -> Result<()> {
        let index = info.index_of(self.feature).ok_or_else(|| {
            ArborError::InvalidArgument(format!(
                "feature {} has no slot in the optimization info",
                self.feature
            ))
        })?;
        self.dense_index = Some(index);
        Ok(())
    }

    pub fn print(&self, feature_space: &dyn FeatureSpace) -> String {
        let name = feature_space.print_feature(self.feature);
        let test = match self.op {
            SplitOp::LessThan(threshold) => format!("{name} < {threshold}"),
            SplitOp::Equal(operand) => format!("{name} = {operand}"),
            SplitOp::Presence => format!("{name} present"),
        };
        match self.missing {
            MissingPolicy::Branch => test,
            MissingPolicy::Distribute { true_fraction } => {
                format!("{test} [missing: {true_fraction:.2} true]")
            }
        }
    }

    pub fn serialize(
        &self,
        store: &mut StoreWriter<dyn Write + '_>,
        feature_space: &dyn FeatureSpace,
    ) -> Result<()> {
        feature_space.serialize_feature(store, self.feature)?;
        store.write_compact_size(self.op.tag())?;
        store.write_f32(self.op.operand())?;
        store.write_compact_size(self.missing.tag())?;
        store.write_f32(self.missing.operand())
    }

    pub fn reconstitute(
        store: &mut StoreReader<dyn Read + '_>,
        feature_space: &dyn FeatureSpace,
    ) -> Result<Self> {
        let feature = feature_space.reconstitute_feature(store)?;
        let op_tag = store.read_compact_size()?;
        let op = SplitOp::from_parts(op_tag, store.read_f32()?)?;
        let missing_tag = store.read_compact_size()?;
        let missing = MissingPolicy::from_parts(missing_tag, store.read_f32()?)?;
        Ok(Split::new(feature, op).with_missing_policy(missing))
    }
}

//! The weighted descent shared by every prediction entry point.
//!
//! An example can satisfy more than one branch of a split (partially, when
//! its value is missing), so prediction visits every branch with a positive
//! weight and each leaf contributes its distribution scaled by the product
//! of branch weights on its path. What a leaf contributes *to* is up to the
//! [`Results`] sink; where split weights come from is up to
//! [`GetFeatures`].

use crate::classifiers::decision_tree::split::{Branch, Split, Weights};
use crate::classifiers::decision_tree::tree::Ptr;
use crate::core::features::FeatureSet;
use strum::IntoEnumIterator;

pub(crate) trait GetFeatures {
    fn weights(&self, split: &Split) -> Weights;
}

pub(crate) struct SparseFeatures<'a>(pub &'a FeatureSet);

impl GetFeatures for SparseFeatures<'_> {
    #[inline]
    fn weights(&self, split: &Split) -> Weights {
        split.apply(self.0)
    }
}

/// Requires every split to have been optimized against the array layout.
pub(crate) struct DenseFeatures<'a>(pub &'a [f32]);

impl GetFeatures for DenseFeatures<'_> {
    #[inline]
    fn weights(&self, split: &Split) -> Weights {
        split.apply_dense(self.0)
    }
}

pub(crate) trait Results {
    fn add(&mut self, dist: &[f32], weight: f64);
}

/// Score of a single label.
pub(crate) struct LabelResults {
    label: usize,
    result: f64,
}

impl LabelResults {
    pub fn new(label: usize) -> Self {
        Self { label, result: 0.0 }
    }

    pub fn result(&self) -> f32 {
        self.result as f32
    }
}

impl Results for LabelResults {
    #[inline]
    fn add(&mut self, dist: &[f32], weight: f64) {
        if let Some(&p) = dist.get(self.label) {
            self.result += weight * p as f64;
        }
    }
}

/// Full label distribution.
pub(crate) struct DistResults {
    accum: Vec<f64>,
}

impl DistResults {
    pub fn new(label_count: usize) -> Self {
        Self {
            accum: vec![0.0; label_count],
        }
    }

    pub fn result(&self) -> Vec<f32> {
        self.accum.iter().map(|&v| v as f32).collect()
    }
}

impl Results for DistResults {
    #[inline]
    fn add(&mut self, dist: &[f32], weight: f64) {
        for (a, &p) in self.accum.iter_mut().zip(dist) {
            *a += p as f64 * weight;
        }
    }
}

/// Adds into a buffer owned by the caller, scaled by an outer weight.
pub(crate) struct AccumResults<'a> {
    accum: &'a mut [f64],
    weight: f64,
}

impl<'a> AccumResults<'a> {
    pub fn new(accum: &'a mut [f64], weight: f64) -> Self {
        Self { accum, weight }
    }
}

impl Results for AccumResults<'_> {
    #[inline]
    fn add(&mut self, dist: &[f32], weight: f64) {
        let factor = weight * self.weight;
        if let ([a0, a1], [p0, p1]) = (&mut *self.accum, dist) {
            *a0 += *p0 as f64 * factor;
            *a1 += *p1 as f64 * factor;
            return;
        }
        for (a, &p) in self.accum.iter_mut().zip(dist) {
            *a += p as f64 * factor;
        }
    }
}

pub(crate) fn predict_recursive<G, R>(get_features: &G, results: &mut R, ptr: &Ptr, weight: f64)
where
    G: GetFeatures,
    R: Results,
{
    let node = match ptr {
        Ptr::Empty => return,
        Ptr::Leaf(leaf) => {
            results.add(&leaf.pred, weight);
            return;
        }
        Ptr::Node(node) => node,
    };

    let weights = get_features.weights(&node.split);

    for branch in Branch::iter() {
        if weights[branch] > 0.0 {
            predict_recursive(
                get_features,
                results,
                node.child(branch),
                weight * weights[branch] as f64,
            );
        }
    }
}

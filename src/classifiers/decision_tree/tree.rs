use crate::classifiers::LabelDist;
use crate::classifiers::decision_tree::split::{Branch, Split};
use crate::core::features::FeatureSpace;
use crate::core::store::{StoreReader, StoreWriter};
use crate::error::{ArborError, Result};
use std::io::{Read, Write};

const PTR_EMPTY: u64 = 0;
const PTR_LEAF: u64 = 1;
const PTR_NODE: u64 = 2;

/// Terminal node holding the label distribution examples end up with.
#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
    pub pred: LabelDist,
    /// Training weight that reached this leaf.
    pub examples: f32,
}

impl Leaf {
    pub fn new(pred: LabelDist, examples: f32) -> Self {
        Self { pred, examples }
    }
}

/// Internal node. `pred` is the distribution at the node itself, which the
/// explanation engine uses as the baseline its children are compared to.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub split: Split,
    pub child_true: Ptr,
    pub child_false: Ptr,
    pub child_missing: Ptr,
    pub pred: LabelDist,
    pub examples: f32,
    /// Split quality statistic; diagnostic only.
    pub z: f32,
}

impl Node {
    pub fn new(split: Split, pred: LabelDist, examples: f32, z: f32) -> Self {
        Self {
            split,
            child_true: Ptr::Empty,
            child_false: Ptr::Empty,
            child_missing: Ptr::Empty,
            pred,
            examples,
            z,
        }
    }

    pub fn with_child(mut self, branch: Branch, child: Ptr) -> Self {
        *self.child_mut(branch) = child;
        self
    }

    pub fn child(&self, branch: Branch) -> &Ptr {
        match branch {
            Branch::True => &self.child_true,
            Branch::False => &self.child_false,
            Branch::Missing => &self.child_missing,
        }
    }

    pub fn child_mut(&mut self, branch: Branch) -> &mut Ptr {
        match branch {
            Branch::True => &mut self.child_true,
            Branch::False => &mut self.child_false,
            Branch::Missing => &mut self.child_missing,
        }
    }
}

/// Owning handle to a subtree.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Ptr {
    #[default]
    Empty,
    Node(Box<Node>),
    Leaf(Box<Leaf>),
}

impl Ptr {
    pub fn leaf(pred: LabelDist, examples: f32) -> Self {
        Ptr::Leaf(Box::new(Leaf::new(pred, examples)))
    }

    pub fn node(node: Node) -> Self {
        Ptr::Node(Box::new(node))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Ptr::Empty)
    }

    /// Distribution stored at this node or leaf.
    pub fn pred(&self) -> Option<&[f32]> {
        match self {
            Ptr::Empty => None,
            Ptr::Node(node) => Some(&node.pred),
            Ptr::Leaf(leaf) => Some(&leaf.pred),
        }
    }

    pub fn examples(&self) -> Option<f32> {
        match self {
            Ptr::Empty => None,
            Ptr::Node(node) => Some(node.examples),
            Ptr::Leaf(leaf) => Some(leaf.examples),
        }
    }

    fn serialize(
        &self,
        store: &mut StoreWriter<dyn Write + '_>,
        feature_space: &dyn FeatureSpace,
    ) -> Result<()> {
        match self {
            Ptr::Empty => store.write_compact_size(PTR_EMPTY),
            Ptr::Leaf(leaf) => {
                store.write_compact_size(PTR_LEAF)?;
                store.write_dist(&leaf.pred)?;
                store.write_f32(leaf.examples)
            }
            Ptr::Node(node) => {
                store.write_compact_size(PTR_NODE)?;
                node.split.serialize(store, feature_space)?;
                node.child_true.serialize(store, feature_space)?;
                node.child_false.serialize(store, feature_space)?;
                node.child_missing.serialize(store, feature_space)?;
                store.write_dist(&node.pred)?;
                store.write_f32(node.examples)?;
                store.write_f32(node.z)
            }
        }
    }

    fn reconstitute(
        store: &mut StoreReader<dyn Read + '_>,
        reader: &TreeReader<'_>,
        depth: usize,
    ) -> Result<Ptr> {
        let tag = store.read_compact_size()?;
        if tag != PTR_EMPTY && depth > reader.max_depth {
            return Err(ArborError::TooDeep(reader.max_depth));
        }
        match tag {
            PTR_EMPTY => Ok(Ptr::Empty),
            PTR_LEAF => {
                let pred = reader.read_dist(store)?;
                let examples = store.read_f32()?;
                Ok(Ptr::leaf(pred, examples))
            }
            PTR_NODE => {
                let split = Split::reconstitute(store, reader.feature_space)?;
                let child_true = Ptr::reconstitute(store, reader, depth + 1)?;
                let child_false = Ptr::reconstitute(store, reader, depth + 1)?;
                let child_missing = Ptr::reconstitute(store, reader, depth + 1)?;
                let pred = reader.read_dist(store)?;
                let examples = store.read_f32()?;
                let z = store.read_f32()?;
                Ok(Ptr::node(Node {
                    split,
                    child_true,
                    child_false,
                    child_missing,
                    pred,
                    examples,
                    z,
                }))
            }
            other => Err(ArborError::Malformed(format!(
                "unknown tree pointer tag {other}"
            ))),
        }
    }
}

struct TreeReader<'a> {
    feature_space: &'a dyn FeatureSpace,
    label_count: usize,
    max_depth: usize,
}

impl TreeReader<'_> {
    fn read_dist(&self, store: &mut StoreReader<dyn Read + '_>) -> Result<LabelDist> {
        let dist = store.read_dist()?;
        if dist.len() != self.label_count {
            return Err(ArborError::Malformed(format!(
                "distribution has {} entries, expected {}",
                dist.len(),
                self.label_count
            )));
        }
        Ok(dist)
    }
}

/// A decision tree's structure, rooted at `root`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tree {
    pub root: Ptr,
}

impl Tree {
    pub fn new(root: Ptr) -> Self {
        Self { root }
    }

    pub fn node_count(&self) -> usize {
        count(&self.root, &|p| matches!(p, Ptr::Node(_)))
    }

    pub fn leaf_count(&self) -> usize {
        count(&self.root, &|p| matches!(p, Ptr::Leaf(_)))
    }

    /// Number of nodes and leaves on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        depth(&self.root)
    }

    pub fn serialize(
        &self,
        store: &mut StoreWriter<dyn Write + '_>,
        feature_space: &dyn FeatureSpace,
    ) -> Result<()> {
        self.root.serialize(store, feature_space)
    }

    /// Reads a tree body, checking every distribution has `label_count`
    /// entries and that no path is deeper than `max_depth`.
    pub fn reconstitute(
        store: &mut StoreReader<dyn Read + '_>,
        feature_space: &dyn FeatureSpace,
        label_count: usize,
        max_depth: usize,
    ) -> Result<Tree> {
        let reader = TreeReader {
            feature_space,
            label_count,
            max_depth,
        };
        Ok(Tree::new(Ptr::reconstitute(store, &reader, 1)?))
    }
}

fn count(ptr: &Ptr, matches: &dyn Fn(&Ptr) -> bool) -> usize {
    let here = usize::from(matches(ptr));
    match ptr {
        Ptr::Node(node) => {
            here + count(&node.child_true, matches)
                + count(&node.child_false, matches)
                + count(&node.child_missing, matches)
        }
        _ => here,
    }
}

fn depth(ptr: &Ptr) -> usize {
    match ptr {
        Ptr::Empty => 0,
        Ptr::Leaf(_) => 1,
        Ptr::Node(node) => {
            1 + depth(&node.child_true)
                .max(depth(&node.child_false))
                .max(depth(&node.child_missing))
        }
    }
}

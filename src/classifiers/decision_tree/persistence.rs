use crate::classifiers::OutputEncoding;
use crate::classifiers::decision_tree::DecisionTree;
use crate::classifiers::decision_tree::tree::Tree;
use crate::config::TreeConfig;
use crate::core::features::FeatureSpace;
use crate::core::store::{StoreReader, StoreWriter};
use crate::error::{ArborError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const RECORD_ID: &str = "DECISION_TREE";
const CURRENT_VERSION: u64 = 3;
const END_MARKER: u64 = 12345;

impl DecisionTree {
    /// Writes the classifier as a `DECISION_TREE` record at the current
    /// version.
    pub fn serialize(&self, store: &mut StoreWriter<dyn Write + '_>) -> Result<()> {
        store.write_string(RECORD_ID)?;
        store.write_compact_size(CURRENT_VERSION)?;
        store.write_compact_size(self.label_count as u64)?;
        self.feature_space
            .serialize_predicted(store, self.predicted)?;
        self.tree.serialize(store, self.feature_space.as_ref())?;
        store.write_compact_size(self.encoding.tag())?;
        store.write_compact_size(END_MARKER)?;
        debug!(
            nodes = self.tree.node_count(),
            leaves = self.tree.leaf_count(),
            "serialized decision tree"
        );
        Ok(())
    }

    /// Replaces this classifier with the one stored in `store`. On error
    /// `self` is left as it was.
    pub fn reconstitute(
        &mut self,
        store: &mut StoreReader<dyn Read + '_>,
        feature_space: Arc<dyn FeatureSpace>,
    ) -> Result<()> {
        self.reconstitute_with_config(store, feature_space, &TreeConfig::default())
    }

    #[instrument(skip_all, fields(max_depth = config.max_depth))]
    pub fn reconstitute_with_config(
        &mut self,
        store: &mut StoreReader<dyn Read + '_>,
        feature_space: Arc<dyn FeatureSpace>,
        config: &TreeConfig,
    ) -> Result<()> {
        let id = store.read_string()?;
        if id != RECORD_ID {
            return Err(ArborError::BadRecordId(id));
        }

        let version = store.read_compact_size()?;
        let (label_count, predicted, tree, encoding) = match version {
            1 => {
                warn!(version, "reading legacy decision tree record");
                let label_count = read_label_count(store, config)?;
                let tree =
                    Tree::reconstitute(store, feature_space.as_ref(), label_count, config.max_depth)?;
                (label_count, None, tree, OutputEncoding::Probability)
            }
            2 | 3 => {
                if version < CURRENT_VERSION {
                    warn!(version, "reading legacy decision tree record");
                }
                let label_count = read_label_count(store, config)?;
                let predicted = feature_space.reconstitute_predicted(store)?;
                let tree =
                    Tree::reconstitute(store, feature_space.as_ref(), label_count, config.max_depth)?;
                let encoding = if version >= 3 {
                    let tag = store.read_compact_size()?;
                    OutputEncoding::from_tag(tag).ok_or_else(|| {
                        ArborError::Malformed(format!("unknown output encoding {tag}"))
                    })?
                } else {
                    OutputEncoding::Probability
                };
                (label_count, predicted, tree, encoding)
            }
            other => return Err(ArborError::UnsupportedVersion(other)),
        };

        let marker = store.read_compact_size()?;
        if marker != END_MARKER {
            return Err(ArborError::Corrupted(format!(
                "read end marker {marker}, expected {END_MARKER}"
            )));
        }

        info!(
            version,
            label_count,
            nodes = tree.node_count(),
            leaves = tree.leaf_count(),
            "reconstituted decision tree"
        );

        *self = DecisionTree {
            feature_space,
            predicted,
            label_count,
            tree,
            encoding,
            optimized: None,
        };
        Ok(())
    }

    pub fn from_store(
        store: &mut StoreReader<dyn Read + '_>,
        feature_space: Arc<dyn FeatureSpace>,
        config: &TreeConfig,
    ) -> Result<Self> {
        let mut classifier = DecisionTree::new(Arc::clone(&feature_space), 0);
        classifier.reconstitute_with_config(store, feature_space, config)?;
        Ok(classifier)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = StoreWriter::new(Vec::new());
        self.serialize(&mut writer)?;
        Ok(writer.into_inner())
    }

    pub fn from_bytes(bytes: &[u8], feature_space: Arc<dyn FeatureSpace>) -> Result<Self> {
        Self::from_bytes_with_config(bytes, feature_space, &TreeConfig::default())
    }

    pub fn from_bytes_with_config(
        bytes: &[u8],
        feature_space: Arc<dyn FeatureSpace>,
        config: &TreeConfig,
    ) -> Result<Self> {
        let mut reader = StoreReader::new(bytes);
        let classifier = Self::from_store(&mut reader, feature_space, config)?;
        if config.reject_trailing_bytes && !reader.at_end()? {
            return Err(ArborError::Corrupted(
                "trailing bytes after end marker".into(),
            ));
        }
        Ok(classifier)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = StoreWriter::new(BufWriter::new(File::create(path)?));
        self.serialize(&mut writer)?;
        writer.flush()
    }

    pub fn load<P: AsRef<Path>>(path: P, feature_space: Arc<dyn FeatureSpace>) -> Result<Self> {
        let bytes = {
            let mut buf = Vec::new();
            BufReader::new(File::open(path)?).read_to_end(&mut buf)?;
            buf
        };
        Self::from_bytes(&bytes, feature_space)
    }
}

fn read_label_count(store: &mut StoreReader<dyn Read + '_>, config: &TreeConfig) -> Result<usize> {
    let label_count = store.read_len()?;
    if label_count > config.max_labels {
        return Err(ArborError::Malformed(format!(
            "label count {label_count} exceeds limit of {}",
            config.max_labels
        )));
    }
    Ok(label_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::decision_tree::split::{Branch, Split, SplitOp};
    use crate::classifiers::decision_tree::tree::{Node, Ptr};
    use crate::core::features::{Feature, FeatureSet, NamedFeatureSpace};
    use crate::testing::dummies::{AGE, credit_classifier, credit_feature_space, credit_tree};
    use crate::testing::probes::credit_probes;

    const VERSION_OFFSET: usize = 1 + RECORD_ID.len();

    fn fs() -> Arc<dyn FeatureSpace> {
        credit_feature_space()
    }

    fn record(version: u64, write_body: impl FnOnce(&mut StoreWriter<Vec<u8>>)) -> Vec<u8> {
        let mut writer = StoreWriter::new(Vec::new());
        writer.write_string(RECORD_ID).unwrap();
        writer.write_compact_size(version).unwrap();
        write_body(&mut writer);
        writer.write_compact_size(END_MARKER).unwrap();
        writer.into_inner()
    }

    #[test]
    fn round_trip_preserves_tree_and_predictions() {
        let original = credit_classifier().with_encoding(OutputEncoding::PlusMinusOne);
        assert!(original.tree().depth() >= 3);
        let bytes = original.to_bytes().unwrap();

        let restored = DecisionTree::from_bytes(&bytes, fs()).unwrap();
        assert_eq!(restored.tree(), original.tree());
        assert_eq!(restored.label_count, 3);
        assert_eq!(restored.predicted, Some(Feature(4)));
        assert_eq!(restored.encoding, OutputEncoding::PlusMinusOne);

        for probe in credit_probes(3, 100, 0.3) {
            let a: Vec<u32> = original.predict(&probe).iter().map(|p| p.to_bits()).collect();
            let b: Vec<u32> = restored.predict(&probe).iter().map(|p| p.to_bits()).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn reconstitution_clears_optimization() {
        let mut classifier = credit_classifier();
        let info = crate::core::features::OptimizationInfo::from_feature_space(
            classifier.feature_space.as_ref(),
        );
        classifier.optimize(&info).unwrap();
        let bytes = classifier.to_bytes().unwrap();

        let mut reader = StoreReader::new(bytes.as_slice());
        classifier.reconstitute(&mut reader, fs()).unwrap();
        assert!(!classifier.predict_is_optimized());
    }

    #[test]
    fn unknown_versions_are_format_errors() {
        let mut bytes = credit_classifier().to_bytes().unwrap();
        for version in [0u8, 99] {
            bytes[VERSION_OFFSET] = version;
            let err = DecisionTree::from_bytes(&bytes, fs()).err().unwrap();
            assert!(matches!(err, ArborError::UnsupportedVersion(v) if v == version as u64));
            assert!(err.is_format_error());
            assert!(!err.is_corruption());
        }
    }

    #[test]
    fn altered_end_marker_is_corruption() {
        let mut bytes = credit_classifier().to_bytes().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let err = DecisionTree::from_bytes(&bytes, fs()).err().unwrap();
        assert!(err.is_corruption(), "{err}");
        assert!(!err.is_format_error());
    }

    #[test]
    fn wrong_record_id_is_rejected() {
        let mut writer = StoreWriter::new(Vec::new());
        writer.write_string("PERCEPTRON LAYER").unwrap();
        let bytes = writer.into_inner();
        let err = DecisionTree::from_bytes(&bytes, fs()).err().unwrap();
        assert!(matches!(err, ArborError::BadRecordId(ref id) if id == "PERCEPTRON LAYER"));
    }

    #[test]
    fn failed_reconstitution_leaves_classifier_untouched() {
        let bytes = credit_classifier().to_bytes().unwrap();
        let truncated = &bytes[..bytes.len() / 2];

        let mut target = DecisionTree::new(fs(), 2);
        let mut reader = StoreReader::new(truncated);
        let err = target.reconstitute(&mut reader, fs()).unwrap_err();
        assert!(err.is_format_error(), "{err}");
        assert_eq!(target.label_count, 2);
        assert_eq!(target.tree().node_count(), 0);
    }

    #[test]
    fn version_one_records_default_to_probability() {
        let feature_space = fs();
        let bytes = record(1, |w| {
            w.write_compact_size(3).unwrap();
            credit_tree().serialize(w, feature_space.as_ref()).unwrap();
        });
        let restored = DecisionTree::from_bytes(&bytes, fs()).unwrap();
        assert_eq!(restored.predicted, None);
        assert_eq!(restored.encoding, OutputEncoding::Probability);
        assert_eq!(restored.tree(), &credit_tree());
    }

    #[test]
    fn version_two_records_read_predicted_feature() {
        let feature_space = fs();
        let bytes = record(2, |w| {
            w.write_compact_size(3).unwrap();
            feature_space
                .serialize_predicted(w, Some(Feature(2)))
                .unwrap();
            credit_tree().serialize(w, feature_space.as_ref()).unwrap();
        });
        let restored = DecisionTree::from_bytes(&bytes, fs()).unwrap();
        assert_eq!(restored.predicted, Some(Feature(2)));
        assert_eq!(restored.encoding, OutputEncoding::Probability);
    }

    #[test]
    fn unknown_output_encoding_is_malformed() {
        let feature_space = fs();
        let bytes = record(3, |w| {
            w.write_compact_size(3).unwrap();
            feature_space.serialize_predicted(w, None).unwrap();
            credit_tree().serialize(w, feature_space.as_ref()).unwrap();
            w.write_compact_size(42).unwrap();
        });
        let err = DecisionTree::from_bytes(&bytes, fs()).err().unwrap();
        assert!(matches!(err, ArborError::Malformed(_)));
    }

    #[test]
    fn trailing_bytes_depend_on_config() {
        let mut bytes = credit_classifier().to_bytes().unwrap();
        bytes.push(0);

        let err = DecisionTree::from_bytes(&bytes, fs()).err().unwrap();
        assert!(err.is_corruption());

        let lenient = TreeConfig {
            reject_trailing_bytes: false,
            ..TreeConfig::default()
        };
        assert!(DecisionTree::from_bytes_with_config(&bytes, fs(), &lenient).is_ok());
    }

    #[test]
    fn depth_limit_applies_to_records() {
        let bytes = credit_classifier().to_bytes().unwrap();
        let shallow = TreeConfig {
            max_depth: 2,
            ..TreeConfig::default()
        };
        let err = DecisionTree::from_bytes_with_config(&bytes, fs(), &shallow)
            .err()
            .unwrap();
        assert!(matches!(err, ArborError::TooDeep(2)));
    }

    /// Single path of `depth` nodes and leaves, every split routing to true.
    fn chain(depth: usize) -> DecisionTree {
        let mut ptr = Ptr::leaf(vec![0.25, 0.75], 1.0);
        for _ in 1..depth {
            let split = Split::new(AGE, SplitOp::LessThan(100.0));
            let node = Node::new(split, vec![0.5, 0.5], 1.0, 0.0).with_child(Branch::True, ptr);
            ptr = Ptr::node(node);
        }
        DecisionTree::new(fs(), 2)
            .with_tree(Tree::new(ptr))
            .unwrap()
    }

    #[test]
    fn deepest_default_record_fits_a_small_stack() {
        let max_depth = TreeConfig::default().max_depth;
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || {
                let original = chain(max_depth);
                assert_eq!(original.tree().depth(), max_depth);
                let bytes = original.to_bytes().unwrap();

                let restored = DecisionTree::from_bytes(&bytes, fs()).unwrap();
                let probe: FeatureSet = [(AGE, 1.0)].into_iter().collect();
                assert_eq!(restored.predict(&probe), vec![0.25, 0.75]);
                let explanation = restored.explain(&probe, 1, 1.0).unwrap();
                assert!((explanation.total() - 0.75).abs() < 1e-6);
                assert!(!restored.print().is_empty());

                let too_deep = chain(max_depth + 1).to_bytes().unwrap();
                let err = DecisionTree::from_bytes(&too_deep, fs()).err().unwrap();
                assert!(matches!(err, ArborError::TooDeep(d) if d == max_depth));
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn oversized_label_count_is_rejected() {
        let feature_space = fs();
        let bytes = record(3, |w| {
            w.write_compact_size(1 << 61).unwrap();
            feature_space.serialize_predicted(w, None).unwrap();
            w.write_compact_size(0).unwrap();
            w.write_compact_size(OutputEncoding::Probability.tag()).unwrap();
        });
        let err = DecisionTree::from_bytes(&bytes, fs()).err().unwrap();
        assert!(matches!(err, ArborError::Malformed(_)), "{err}");

        let credit = credit_classifier().to_bytes().unwrap();
        let two_labels = TreeConfig {
            max_labels: 2,
            ..TreeConfig::default()
        };
        let err = DecisionTree::from_bytes_with_config(&credit, fs(), &two_labels)
            .err()
            .unwrap();
        assert!(err.is_format_error());
    }

    #[test]
    fn features_outside_the_space_are_rejected() {
        let bytes = credit_classifier().to_bytes().unwrap();
        let narrow: Arc<dyn FeatureSpace> = Arc::new(NamedFeatureSpace::new(["age"]));
        let err = DecisionTree::from_bytes(&bytes, narrow).err().unwrap();
        assert!(err.is_format_error());
    }

    #[test]
    fn save_and_load_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credit.tree");
        let original = credit_classifier();
        original.save(&path).unwrap();

        let loaded = DecisionTree::load(&path, fs()).unwrap();
        assert_eq!(loaded.tree(), original.tree());
        let probe: FeatureSet = [(Feature(0), 21.0)].into_iter().collect();
        assert_eq!(loaded.predict(&probe), original.predict(&probe));
    }

    #[test]
    fn load_reports_missing_files_as_io() {
        let dir = tempfile::tempdir().unwrap();
        let err = DecisionTree::load(dir.path().join("absent.tree"), fs())
            .err()
            .unwrap();
        assert!(matches!(err, ArborError::Io(_)));
    }
}

use crate::core::features::Feature;
use crate::core::store::{StoreReader, StoreWriter};
use crate::error::{ArborError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};

/// Names features and knows how to persist references to them.
///
/// Classifiers hold the feature space behind an `Arc`, so implementations
/// must be shareable between threads.
pub trait FeatureSpace: Send + Sync {
    fn print_feature(&self, feature: Feature) -> String;

    fn features(&self) -> Vec<Feature>;

    fn serialize_feature(
        &self,
        store: &mut StoreWriter<dyn Write + '_>,
        feature: Feature,
    ) -> Result<()>;

    fn reconstitute_feature(&self, store: &mut StoreReader<dyn Read + '_>) -> Result<Feature>;

    /// Writes the predicted-feature metadata of a classifier.
    fn serialize_predicted(
        &self,
        store: &mut StoreWriter<dyn Write + '_>,
        predicted: Option<Feature>,
    ) -> Result<()> {
        match predicted {
            Some(feature) => {
                store.write_compact_size(1)?;
                self.serialize_feature(store, feature)
            }
            None => store.write_compact_size(0),
        }
    }

    fn reconstitute_predicted(
        &self,
        store: &mut StoreReader<dyn Read + '_>,
    ) -> Result<Option<Feature>> {
        match store.read_compact_size()? {
            0 => Ok(None),
            1 => self.reconstitute_feature(store).map(Some),
            other => Err(ArborError::Malformed(format!(
                "bad predicted feature flag {other}"
            ))),
        }
    }
}

/// Feature space with one name per feature; `Feature(i)` is the `i`-th name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedFeatureSpace {
    names: Vec<String>,
    #[serde(skip)]
    by_name: HashMap<String, Feature>,
}

impl NamedFeatureSpace {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let by_name = Self::index_names(&names);
        Self { names, by_name }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: NamedFeatureSpace = serde_json::from_str(json)?;
        Ok(Self::new(parsed.names))
    }

    fn index_names(names: &[String]) -> HashMap<String, Feature> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), Feature(i as u32)))
            .collect()
    }

    pub fn feature(&self, name: &str) -> Option<Feature> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, feature: Feature) -> Option<&str> {
        self.names.get(feature.id() as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FeatureSpace for NamedFeatureSpace {
    fn print_feature(&self, feature: Feature) -> String {
        match self.name(feature) {
            Some(name) => name.to_string(),
            None => feature.to_string(),
        }
    }

    fn features(&self) -> Vec<Feature> {
        (0..self.names.len() as u32).map(Feature).collect()
    }

    fn serialize_feature(
        &self,
        store: &mut StoreWriter<dyn Write + '_>,
        feature: Feature,
    ) -> Result<()> {
        store.write_compact_size(feature.id() as u64)
    }

    fn reconstitute_feature(&self, store: &mut StoreReader<dyn Read + '_>) -> Result<Feature> {
        let id = store.read_compact_size()?;
        if id >= self.names.len() as u64 {
            return Err(ArborError::Malformed(format!(
                "feature {id} outside feature space of {} features",
                self.names.len()
            )));
        }
        Ok(Feature(id as u32))
    }
}

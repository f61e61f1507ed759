use crate::error::{ArborError, Result};
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};

/// Limits applied when reading persisted trees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct TreeConfig {
    #[schemars(
        title = "Maximum depth",
        description = "Deepest tree accepted when reconstituting a persisted record"
    )]
    pub max_depth: usize,

    #[schemars(
        title = "Maximum labels",
        description = "Largest label count accepted when reconstituting a persisted record"
    )]
    pub max_labels: usize,

    #[schemars(
        title = "Reject trailing bytes",
        description = "Treat bytes after the end-of-record marker as corruption"
    )]
    pub reject_trailing_bytes: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_labels: 1 << 16,
            reject_trailing_bytes: true,
        }
    }
}

impl TreeConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TreeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(ArborError::InvalidArgument(
                "max-depth must be at least 1".into(),
            ));
        }
        if self.max_labels == 0 {
            return Err(ArborError::InvalidArgument(
                "max-labels must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn schema() -> Schema {
        schema_for!(TreeConfig)
    }
}

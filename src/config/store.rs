use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::store::mongodb_store::MongoDBConfig;

/// The user store backends. We differentiate them via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, JsonSchema)]
#[serde(tag = "type")]
pub enum StoreConfig {
    #[serde(rename = "mongo")]
    MongoDB(MongoDBConfig),
    /// Process-local store, lost on restart. Used by tests and local runs.
    #[serde(rename = "memory")]
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::MongoDB(MongoDBConfig::default())
    }
}

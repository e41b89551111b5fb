use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the session is persisted between runs.
/// We differentiate the backends via a "type" tag in the YAML.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// Nothing survives the process; useful for tests and one-shot calls.
    #[serde(rename = "memory")]
    Memory,
    /// A JSON document of string keys to string values.
    #[serde(rename = "file")]
    File { path: PathBuf },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::File {
            path: PathBuf::from("./session.json"),
        }
    }
}

//! Query parameter models
//!
//! Boolean parameters accept `true`/`1` (case-insensitive) as true and
//! treat anything else, including absence, as false.

use serde::{Deserialize, Deserializer};

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|value| {
            let value = value.to_ascii_lowercase();
            value == "true" || value == "1"
        })
        .unwrap_or(false))
}

/// `waitForSync` on create/mutate routes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SyncQuery {
    #[serde(rename = "waitForSync", deserialize_with = "lenient_bool")]
    pub wait_for_sync: bool,
}

/// `dropCollections` on the drop-graph route.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DropGraphQuery {
    #[serde(rename = "dropCollections", deserialize_with = "lenient_bool")]
    pub drop_collections: bool,
}

/// `dropCollection` (+ sync) on collection/definition removal routes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DropCollectionQuery {
    #[serde(rename = "dropCollection", deserialize_with = "lenient_bool")]
    pub drop_collection: bool,
    #[serde(rename = "waitForSync", deserialize_with = "lenient_bool")]
    pub wait_for_sync: bool,
}

/// Parameters of the vertex/edge document routes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DocumentQuery {
    #[serde(rename = "waitForSync", deserialize_with = "lenient_bool")]
    pub wait_for_sync: bool,
    #[serde(rename = "keepNull", deserialize_with = "lenient_bool")]
    pub keep_null: bool,
    pub rev: Option<String>,
}

impl DocumentQuery {
    pub fn write_options(&self) -> crate::store::WriteOptions {
        crate::store::WriteOptions {
            wait_for_sync: self.wait_for_sync,
            keep_null: self.keep_null,
        }
    }
}

//! File-import descriptors: custom metadata, chunking, and the long-running
//! operation returned by `importFile`.

use super::status::Status;
use crate::codec::{fill_field, no_wire_defaults, present_value, WireDefaults};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `fileSearchStores/*:importFile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFileRequest {
    /// Resource name of an uploaded file, e.g. `files/abc-123`.
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_metadata: Vec<CustomMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunking_config: Option<ChunkingConfig>,
}

impl ImportFileRequest {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            custom_metadata: Vec::new(),
            chunking_config: None,
        }
    }

    pub fn with_metadata(mut self, metadata: CustomMetadata) -> Self {
        self.custom_metadata.push(metadata);
        self
    }

    pub fn with_chunking_config(mut self, config: ChunkingConfig) -> Self {
        self.chunking_config = Some(config);
        self
    }
}

/// User-supplied key/value attached to an imported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMetadata {
    pub key: String,
    #[serde(flatten)]
    pub value: MetadataValue,
}

impl CustomMetadata {
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: MetadataValue::StringValue(value.into()),
        }
    }

    pub fn numeric(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value: MetadataValue::NumericValue(value),
        }
    }

    pub fn string_list<I, S>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            value: MetadataValue::StringListValue(StringList {
                values: values.into_iter().map(Into::into).collect(),
            }),
        }
    }
}

/// Exactly one value kind per metadata entry, keyed on the wire by its name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetadataValue {
    StringValue(String),
    StringListValue(StringList),
    NumericValue(f64),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringList {
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_space_config: Option<WhiteSpaceConfig>,
}

impl ChunkingConfig {
    pub fn white_space(max_tokens_per_chunk: u32, max_overlap_tokens: u32) -> Self {
        Self {
            white_space_config: Some(WhiteSpaceConfig {
                max_tokens_per_chunk: Some(max_tokens_per_chunk),
                max_overlap_tokens: Some(max_overlap_tokens),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteSpaceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens_per_chunk: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_overlap_tokens: Option<u32>,
}

/// Generic long-running operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub response: Option<Value>,
}

impl Operation {
    pub fn is_done(&self) -> bool {
        self.done.unwrap_or(false)
    }
}

impl WireDefaults for Operation {
    fn fill_defaults(&self, value: &mut Value) {
        fill_field(value, "error", &self.error);
    }
}

no_wire_defaults!(
    ImportFileRequest,
    CustomMetadata,
    MetadataValue,
    StringList,
    ChunkingConfig,
    WhiteSpaceConfig,
);

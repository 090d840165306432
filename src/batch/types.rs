//! Batch API documents: the create request, the batch resource, and the
//! long-running operation envelope.

use crate::codec::{decode, fill_field, no_wire_defaults, present_value, WireDefaults};
use crate::types::{GenerateContentRequest, GenerateContentResponse, Status};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `models/*:batchGenerateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBatchRequest {
    pub batch: GenerateContentBatch,
}

/// A batch of generation requests, as submitted and as reported back.
///
/// Fields after `input_config` are populated by the service only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentBatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_config: Option<InputConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<BatchState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<BatchOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_stats: Option<BatchStats>,
}

/// Where the batch reads its requests from: inline or an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<InlinedRequests>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlinedRequests {
    #[serde(default)]
    pub requests: Vec<InlinedRequest>,
}

impl InlinedRequests {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Metadata keys in request order; requests without a key are skipped.
    pub fn keys(&self) -> Vec<&str> {
        self.requests
            .iter()
            .filter_map(|r| r.metadata.as_ref().map(|m| m.key.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlinedRequest {
    pub request: GenerateContentRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RequestMetadata>,
}

/// Caller-chosen key echoed back on the matching response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchState {
    BatchStatePending,
    BatchStateRunning,
    BatchStateSucceeded,
    BatchStateFailed,
    BatchStateCancelled,
    BatchStateExpired,
    #[serde(other)]
    BatchStateUnspecified,
}

impl BatchState {
    /// True once the batch can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchState::BatchStateSucceeded
                | BatchState::BatchStateFailed
                | BatchState::BatchStateCancelled
                | BatchState::BatchStateExpired
        )
    }
}

/// Request counters. The service encodes these int64 values as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successful_request_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_request_count: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_request_count: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutput {
    /// Uploaded results file, for file-based batches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inlined_responses: Option<InlinedResponses>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlinedResponses {
    #[serde(default)]
    pub inlined_responses: Vec<InlinedResponse>,
}

/// Result of one inlined request: a response or an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlinedResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<GenerateContentResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RequestMetadata>,
}

impl InlinedResponse {
    pub fn key(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.key.as_str())
    }
}

/// Long-running operation wrapping a batch.
///
/// `metadata` carries the batch while it runs; `response` carries it once
/// `done` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOperation {
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GenerateContentBatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub response: Option<Value>,
}

impl BatchOperation {
    pub fn is_done(&self) -> bool {
        self.done.unwrap_or(false)
    }

    /// Current view of the batch: the final response when one is present,
    /// otherwise the running metadata. A response that does not decode as a
    /// batch is an error.
    pub fn batch(&self) -> Result<Option<GenerateContentBatch>> {
        match &self.response {
            Some(response) if !response.is_null() => {
                decode(&response.to_string()).map(Some).map_err(|e| match e {
                    Error::Decode { path, message, raw } => Error::Decode {
                        path: if path.is_empty() {
                            "response".to_string()
                        } else {
                            format!("response.{}", path)
                        },
                        message,
                        raw,
                    },
                    other => other,
                })
            }
            _ => Ok(self.metadata.clone()),
        }
    }
}

impl WireDefaults for GenerateContentBatch {
    fn fill_defaults(&self, value: &mut Value) {
        fill_field(value, "output", &self.output);
    }
}

impl WireDefaults for BatchOutput {
    fn fill_defaults(&self, value: &mut Value) {
        fill_field(value, "inlinedResponses", &self.inlined_responses);
    }
}

impl WireDefaults for InlinedResponses {
    fn fill_defaults(&self, value: &mut Value) {
        fill_field(value, "inlinedResponses", &self.inlined_responses);
    }
}

impl WireDefaults for InlinedResponse {
    fn fill_defaults(&self, value: &mut Value) {
        fill_field(value, "error", &self.error);
    }
}

impl WireDefaults for BatchOperation {
    fn fill_defaults(&self, value: &mut Value) {
        fill_field(value, "metadata", &self.metadata);
        fill_field(value, "error", &self.error);
    }
}

impl WireDefaults for CreateBatchRequest {
    fn fill_defaults(&self, value: &mut Value) {
        fill_field(value, "batch", &self.batch);
    }
}

no_wire_defaults!(
    InputConfig,
    InlinedRequests,
    InlinedRequest,
    RequestMetadata,
    BatchState,
    BatchStats,
);

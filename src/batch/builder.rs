//! Builders for the nested batch document.
//!
//! Each builder owns one scope of the document. Setting a scope twice keeps
//! the last value. Nothing is validated: an empty request list, duplicate
//! requests and repeated keys are all passed through as given.

use super::types::{
    CreateBatchRequest, GenerateContentBatch, InlinedRequest, InlinedRequests, InputConfig,
    RequestMetadata,
};
use crate::types::GenerateContentRequest;

/// Builds the `batch` scope of a [`CreateBatchRequest`].
#[derive(Debug, Clone, Default)]
pub struct BatchBuilder {
    display_name: Option<String>,
    model: Option<String>,
    input_config: Option<InputConfig>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn input_config(mut self, config: InputConfig) -> Self {
        self.input_config = Some(config);
        self
    }

    pub fn build(self) -> GenerateContentBatch {
        GenerateContentBatch {
            display_name: self.display_name,
            model: self.model,
            input_config: self.input_config,
            ..Default::default()
        }
    }

    /// The complete `batchGenerateContent` body.
    pub fn build_request(self) -> CreateBatchRequest {
        CreateBatchRequest { batch: self.build() }
    }
}

/// Builds the `inputConfig` scope.
#[derive(Debug, Clone, Default)]
pub struct InputConfigBuilder {
    file_name: Option<String>,
    requests: Option<InlinedRequests>,
}

impl InputConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(mut self, requests: InlinedRequests) -> Self {
        self.requests = Some(requests);
        self
    }

    /// Read requests from an uploaded JSONL file instead of inline.
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn build(self) -> InputConfig {
        InputConfig {
            file_name: self.file_name,
            requests: self.requests,
        }
    }
}

/// Builds the `requests` list, preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct RequestsBuilder {
    requests: Vec<InlinedRequest>,
}

impl RequestsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, request: InlinedRequest) -> Self {
        self.requests.push(request);
        self
    }

    pub fn build(self) -> InlinedRequests {
        InlinedRequests {
            requests: self.requests,
        }
    }
}

/// Builds one inlined request and its `metadata` scope.
#[derive(Debug, Clone, Default)]
pub struct InlinedRequestBuilder {
    request: GenerateContentRequest,
    metadata: Option<RequestMetadata>,
}

impl InlinedRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(mut self, request: GenerateContentRequest) -> Self {
        self.request = request;
        self
    }

    pub fn metadata_key(mut self, key: impl Into<String>) -> Self {
        self.metadata = Some(RequestMetadata { key: key.into() });
        self
    }

    pub fn build(self) -> InlinedRequest {
        InlinedRequest {
            request: self.request,
            metadata: self.metadata,
        }
    }
}

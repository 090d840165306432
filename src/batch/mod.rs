//! Batch generation: request documents and their builders

pub mod builder;
pub mod types;

pub use builder::{BatchBuilder, InlinedRequestBuilder, InputConfigBuilder, RequestsBuilder};
pub use types::{
    BatchOperation, BatchOutput, BatchState, BatchStats, CreateBatchRequest,
    GenerateContentBatch, InlinedRequest, InlinedRequests, InlinedResponse, InlinedResponses,
    InputConfig, RequestMetadata,
};

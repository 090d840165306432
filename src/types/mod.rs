//! Shared payload types used by unary, batch, and live requests.
//!
//! Field names follow the remote API's camelCase JSON contract and are not
//! renameable. Optional fields are `Option` and omitted from the wire when
//! absent.

pub mod content;
pub mod files;
pub mod generation;
pub mod mime;
pub mod status;

pub use content::{Blob, Content, FileData, FunctionCall, FunctionResponse, Part};
pub use files::{
    ChunkingConfig, CustomMetadata, ImportFileRequest, MetadataValue, Operation, StringList,
    WhiteSpaceConfig,
};
pub use generation::{
    Candidate, FunctionDeclaration, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Modality, PrebuiltVoiceConfig, SpeechConfig, Tool, UsageMetadata,
    VoiceConfig,
};
pub use status::Status;

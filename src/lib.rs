//! Client SDK for the Gemini generative-AI API
//!
//! Typed request/response schema, a JSON codec with tolerant decoding, a
//! bidirectional live session protocol, a batch request builder, and a thin
//! REST client. Network I/O is delegated to `reqwest` and `tokio-tungstenite`.

pub mod batch;
pub mod client;
pub mod codec;
pub mod error;
pub mod live;
pub mod models;
pub mod types;

pub use client::GenAiClient;
pub use codec::Codec;
pub use error::{Error, Result};
pub use models::Config;

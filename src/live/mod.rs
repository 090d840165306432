//! Live (bidirectional streaming) sessions
//!
//! A [`LiveSession`] drives the setup handshake and message exchange over any
//! [`Transport`] that moves UTF-8 text frames. [`WebSocketTransport`] talks to
//! the hosted service; [`MockTransport`] is an in-process pair for tests.

pub mod mock;
pub mod proto;
pub mod session;
pub mod websocket;

pub use mock::{MockTransport, MockTransportHandle};
pub use proto::{
    ClientContent, ClientMessage, RealtimeInput, ServerContent, ServerMessage, Setup, ToolResponse,
};
pub use session::{CloseHandle, LiveSession, SessionState};
pub use websocket::WebSocketTransport;

use crate::Result;
use async_trait::async_trait;

/// Ordered, reliable channel of text frames.
#[async_trait]
pub trait Transport: Send {
    async fn open(&mut self) -> Result<()>;

    async fn send(&mut self, frame: String) -> Result<()>;

    /// Next inbound frame. `None` once the peer has closed the channel.
    ///
    /// A recoverable error ([`crate::Error::Decode`]) covers one unreadable
    /// frame and leaves the channel usable; any other error ends it.
    async fn receive(&mut self) -> Option<Result<String>>;

    async fn close(&mut self) -> Result<()>;
}

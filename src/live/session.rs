//! Session state machine for one live exchange.

use super::proto::{ClientContent, ClientMessage, RealtimeInput, ServerMessage, Setup, ToolResponse};
use super::Transport;
use crate::codec::Codec;
use crate::{Error, Result};
use futures_util::stream::{self, Stream};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, transport not opened, setup not sent.
    Unopened,
    /// Setup sent, no server message decoded yet.
    AwaitingSetupAck,
    Active,
    /// Terminal.
    Closed,
}

/// Closes a [`LiveSession`] from another task.
///
/// A receive pending on the session resolves with [`Error::SessionClosed`].
#[derive(Debug, Clone)]
pub struct CloseHandle {
    token: CancellationToken,
}

impl CloseHandle {
    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// One bidirectional session over a [`Transport`].
///
/// Messages are encoded and handed to the transport immediately, in call
/// order. Inbound frames are decoded one at a time; a malformed or unreadable
/// frame is reported as [`Error::Decode`] without closing the session, while
/// any other transport failure closes it.
pub struct LiveSession<T: Transport> {
    transport: T,
    codec: Codec,
    state: SessionState,
    closing: CancellationToken,
}

impl<T: Transport> LiveSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            codec: Codec::default(),
            state: SessionState::Unopened,
            closing: CancellationToken::new(),
        }
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn state(&self) -> SessionState {
        if self.closing.is_cancelled() {
            SessionState::Closed
        } else {
            self.state
        }
    }

    pub fn close_handle(&self) -> CloseHandle {
        CloseHandle {
            token: self.closing.clone(),
        }
    }

    /// Opens the transport and sends the setup message. Only valid once, as
    /// the first operation of the session.
    pub async fn send_setup(&mut self, setup: Setup) -> Result<()> {
        self.observe_close().await;
        match self.state {
            SessionState::Unopened => {}
            SessionState::Closed => return Err(Error::SessionClosed),
            _ => {
                return Err(Error::Protocol(
                    "setup has already been sent on this session".to_string(),
                ))
            }
        }

        tracing::debug!("Opening live session for {}", setup.model);
        if let Err(e) = self.transport.open().await {
            tracing::error!("Failed to open live transport: {}", e);
            self.closing.cancel();
            self.state = SessionState::Closed;
            return Err(e);
        }

        self.state = SessionState::AwaitingSetupAck;
        self.transmit(ClientMessage::Setup(setup)).await
    }

    pub async fn send_content(&mut self, content: ClientContent) -> Result<()> {
        self.send(ClientMessage::ClientContent(content)).await
    }

    pub async fn send_realtime_input(&mut self, input: RealtimeInput) -> Result<()> {
        self.send(ClientMessage::RealtimeInput(input)).await
    }

    pub async fn send_tool_response(&mut self, response: ToolResponse) -> Result<()> {
        self.send(ClientMessage::ToolResponse(response)).await
    }

    pub async fn send(&mut self, message: ClientMessage) -> Result<()> {
        if let ClientMessage::Setup(setup) = message {
            return self.send_setup(setup).await;
        }

        self.observe_close().await;
        match self.state {
            SessionState::Unopened => Err(Error::Protocol(format!(
                "cannot send {} before setup",
                message.kind()
            ))),
            SessionState::Closed => Err(Error::SessionClosed),
            SessionState::AwaitingSetupAck | SessionState::Active => self.transmit(message).await,
        }
    }

    /// Next server message in receipt order, or `Ok(None)` once the server
    /// has ended the stream.
    pub async fn next_server_message(&mut self) -> Result<Option<ServerMessage>> {
        self.observe_close().await;
        match self.state {
            SessionState::Unopened => {
                return Err(Error::Protocol(
                    "cannot receive before setup has been sent".to_string(),
                ))
            }
            SessionState::Closed => return Err(Error::SessionClosed),
            SessionState::AwaitingSetupAck | SessionState::Active => {}
        }

        let received = tokio::select! {
            biased;
            _ = self.closing.cancelled() => None,
            frame = self.transport.receive() => Some(frame),
        };

        let frame = match received {
            None => {
                tracing::debug!("Live session closed while waiting for a message");
                self.abort().await;
                return Err(Error::SessionClosed);
            }
            Some(None) => {
                tracing::debug!("Live stream ended by server");
                self.abort().await;
                return Ok(None);
            }
            Some(Some(Err(e))) if e.is_recoverable() => {
                tracing::warn!("Skipping unreadable live frame: {}", e);
                return Err(e);
            }
            Some(Some(Err(e))) => {
                tracing::error!("Live transport receive failed: {}", e);
                self.abort().await;
                return Err(e);
            }
            Some(Some(Ok(frame))) => frame,
        };

        let message: ServerMessage = match self.codec.decode(&frame) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Skipping malformed live frame: {}", e);
                return Err(e);
            }
        };

        if self.state == SessionState::AwaitingSetupAck {
            tracing::debug!("Live session active");
            self.state = SessionState::Active;
        }
        tracing::debug!("Received {} message", message.kind());

        Ok(Some(message))
    }

    /// Inbound messages as a stream. Ends after the server closes the stream
    /// or after the first error that closes the session; decode errors are
    /// yielded and the stream continues.
    pub fn messages(&mut self) -> impl Stream<Item = Result<ServerMessage>> + '_ {
        stream::unfold(Some(self), |session| async move {
            let Some(session) = session else {
                return None;
            };
            match session.next_server_message().await {
                Ok(Some(message)) => Some((Ok(message), Some(session))),
                Ok(None) => None,
                Err(e) => {
                    let next = if e.is_recoverable() { Some(session) } else { None };
                    Some((Err(e), next))
                }
            }
        })
    }

    /// Closes the session. Closing an already closed session is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        self.shutdown().await
    }

    async fn transmit(&mut self, message: ClientMessage) -> Result<()> {
        let frame = self.codec.encode(&message)?;
        tracing::debug!("Sending {} message ({} bytes)", message.kind(), frame.len());

        if let Err(e) = self.transport.send(frame).await {
            tracing::error!("Live transport send failed: {}", e);
            self.abort().await;
            return Err(e);
        }
        Ok(())
    }

    /// Applies a close requested through a [`CloseHandle`].
    async fn observe_close(&mut self) {
        if self.closing.is_cancelled() && self.state != SessionState::Closed {
            self.abort().await;
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.closing.cancel();
        if self.state == SessionState::Closed {
            return Ok(());
        }

        let opened = self.state != SessionState::Unopened;
        self.state = SessionState::Closed;
        tracing::debug!("Live session closed");

        if opened {
            self.transport.close().await
        } else {
            Ok(())
        }
    }

    async fn abort(&mut self) {
        if let Err(e) = self.shutdown().await {
            tracing::warn!("Error while closing live transport: {}", e);
        }
    }
}

use super::Transport;
use crate::models::Config;
use crate::{Error, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// [`Transport`] over a WebSocket connection to the live endpoint.
///
/// The API key is sent in the `x-goog-api-key` handshake header. Text and
/// binary frames are both surfaced as text; a binary frame that is not UTF-8
/// is reported as a recoverable [`Error::Decode`]. Pings are answered inline.
pub struct WebSocketTransport {
    url: String,
    api_key: String,
    socket: Option<WsStream>,
}

impl WebSocketTransport {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            socket: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.live_url.clone(), config.api_key.clone())
    }

    fn socket(&mut self) -> Result<&mut WsStream> {
        self.socket
            .as_mut()
            .ok_or_else(|| Error::Transport("WebSocket is not connected".to_string()))
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&mut self) -> Result<()> {
        let mut request = self.url.as_str().into_client_request()?;
        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| Error::Config(format!("API key is not a valid header value: {}", e)))?;
        request.headers_mut().insert("x-goog-api-key", api_key);

        tracing::debug!("Connecting to {}", self.url);
        let (socket, _response) = tokio_tungstenite::connect_async(request).await?;
        self.socket = Some(socket);
        Ok(())
    }

    async fn send(&mut self, frame: String) -> Result<()> {
        self.socket()?.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    async fn receive(&mut self) -> Option<Result<String>> {
        loop {
            let socket = match self.socket() {
                Ok(socket) => socket,
                Err(e) => return Some(Err(e)),
            };

            match socket.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_string())),
                Ok(Message::Binary(bytes)) => {
                    return Some(String::from_utf8(bytes.to_vec()).map_err(|e| {
                        Error::Decode {
                            path: String::new(),
                            message: format!("binary frame is not valid UTF-8: {}", e),
                            raw: String::from_utf8_lossy(&bytes).into_owned(),
                        }
                    }))
                }
                Ok(Message::Ping(payload)) => {
                    if let Err(e) = socket.send(Message::Pong(payload)).await {
                        return Some(Err(e.into()));
                    }
                }
                Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                Ok(Message::Close(frame)) => {
                    tracing::debug!("Server closed live connection: {:?}", frame);
                    return None;
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        let Some(mut socket) = self.socket.take() else {
            return Ok(());
        };

        match socket.close(None).await {
            Ok(())
            | Err(tokio_tungstenite::tungstenite::Error::ConnectionClosed)
            | Err(tokio_tungstenite::tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

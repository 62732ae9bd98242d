//! WebSocket client for the engine's event stream.
//!
//! Each texture request opens its own [`EngineConnection`], scoped to
//! that request's client id, and closes it when monitoring ends. There
//! is no reconnect logic: if the stream cannot be opened or drops, the
//! request fails and the caller must resubmit.

use tokio_tungstenite::{connect_async, MaybeTlsStream};

/// The WebSocket stream type used for engine connections.
pub type WsStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Configuration handle for the engine's WebSocket endpoint.
pub struct EngineClient {
    ws_url: String,
}

/// A live WebSocket connection scoped to one request's client id.
pub struct EngineConnection {
    /// Client id the connection was opened with.
    pub client_id: String,
    /// The raw WebSocket stream for reading frames.
    pub ws_stream: WsStream,
}

impl EngineClient {
    /// Create a new client targeting the engine's WebSocket endpoint.
    ///
    /// * `ws_url` - WebSocket base URL, e.g. `ws://host:8188`.
    pub fn new(ws_url: String) -> Self {
        Self { ws_url }
    }

    /// Open the event stream for the given client id.
    ///
    /// The id is appended as a query parameter so the engine addresses
    /// job events back to this specific client. Connection failure is
    /// fatal for the request; there is no retry.
    pub async fn connect(&self, client_id: &str) -> Result<EngineConnection, EngineClientError> {
        let url = format!("{}/ws?clientId={}", self.ws_url, client_id);

        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            EngineClientError::Connection(format!(
                "Failed to connect to engine at {}: {e}",
                self.ws_url
            ))
        })?;

        tracing::info!(
            client_id = %client_id,
            "Connected to engine event stream at {}",
            self.ws_url,
        );

        Ok(EngineConnection {
            client_id: client_id.to_string(),
            ws_stream,
        })
    }
}

impl EngineConnection {
    /// Close the underlying WebSocket.
    ///
    /// Closing is a terminal action; its own failure is ignored.
    pub async fn close(mut self) {
        let _ = self.ws_stream.close(None).await;
    }
}

/// Errors that can occur when working with the WebSocket client.
#[derive(Debug, thiserror::Error)]
pub enum EngineClientError {
    /// Failed to establish the initial WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),
}

use std::future::Future;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid broker url {0}")]
    InvalidUrl(String),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("connection closed")]
    Closed,
}

/// Duplex binary-frame connection owned by one broker session.
///
/// Implementations must deliver frames in arrival order. `recv` returns
/// `None` once the peer has closed the connection.
pub trait Connection {
    fn send(&mut self, frame: Vec<u8>) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn recv(&mut self) -> impl Future<Output = Option<Result<Vec<u8>, TransportError>>> + Send;

    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Map the URL embedded in a QR payload onto a websocket URL.
/// `http` becomes `ws` and `https` becomes `wss`.
///
/// # Errors
///
/// `TransportError::InvalidUrl` if the URL does not parse or has another scheme.
pub fn normalize_broker_url(raw: &str) -> Result<Url, TransportError> {
    let mut url = Url::parse(raw.trim()).map_err(|_| TransportError::InvalidUrl(raw.to_owned()))?;
    let scheme = match url.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        _ => return Err(TransportError::InvalidUrl(raw.to_owned())),
    };
    url.set_scheme(scheme)
        .map_err(|()| TransportError::InvalidUrl(raw.to_owned()))?;
    Ok(url)
}

/// Websocket connection to a broker.
#[derive(Debug)]
pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsConnection {
    /// # Errors
    ///
    /// `TransportError` if the URL is unusable or the handshake fails.
    pub async fn connect(broker_url: &str) -> Result<Self, TransportError> {
        let url = normalize_broker_url(broker_url)?;
        let (stream, _resp) = connect_async(url.as_str()).await?;
        debug!(url = %url, "websocket connected");
        Ok(Self { stream })
    }
}

impl Connection for WsConnection {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        self.stream.send(Message::Binary(frame)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<Vec<u8>, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Binary(b)) => return Some(Ok(b)),
                Ok(Message::Text(t)) => return Some(Ok(t.into_bytes())),
                Ok(Message::Close(_)) => return None,
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "websocket close");
        }
    }
}

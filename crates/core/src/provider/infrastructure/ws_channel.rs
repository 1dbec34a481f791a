use std::net::TcpStream;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tungstenite::client::IntoClientRequest;
use tungstenite::http::header::AUTHORIZATION;
use tungstenite::http::HeaderValue;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use crate::provider::domain::transcription_channel::TranscriptionChannel;

/// How long one `poll_event` call may wait on the socket before reporting
/// "nothing pending".
const POLL_READ_TIMEOUT: Duration = Duration::from_millis(20);

/// Vendor-specific framing on top of one WebSocket connection: how audio
/// bytes become frames and which control messages bracket the stream.
pub trait WireFormat: Send {
    fn frame_audio(&self, chunk: &[u8]) -> Message;

    /// Control messages sent right after the handshake. Default: none.
    fn open_messages(&self) -> Vec<Message> {
        Vec::new()
    }

    /// Control message announcing end of audio, if the vendor wants one.
    fn close_message(&self) -> Option<Message>;
}

#[derive(Error, Debug)]
pub enum ProviderConnectError {
    #[error("invalid provider endpoint url: {0}")]
    BadUrl(#[source] tungstenite::Error),
    #[error("api key is not a valid header value")]
    BadApiKey,
    #[error("websocket connect to {url} failed: {source}")]
    Connect {
        url: String,
        #[source]
        source: Box<tungstenite::Error>,
    },
    #[error("failed to configure socket read timeout: {0}")]
    SocketConfig(#[source] std::io::Error),
    #[error("failed to send stream-open message: {0}")]
    Open(#[source] Box<tungstenite::Error>),
}

/// Synchronous WebSocket transcription channel.
///
/// The socket carries a short read timeout so `poll_event` returns promptly
/// when nothing is pending; sends remain blocking.
pub struct WsTranscriptionChannel {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    wire: Box<dyn WireFormat>,
    remote_closed: bool,
}

impl WsTranscriptionChannel {
    pub fn connect(
        url: &str,
        authorization: &str,
        wire: Box<dyn WireFormat>,
    ) -> Result<Self, ProviderConnectError> {
        let mut request = url
            .into_client_request()
            .map_err(ProviderConnectError::BadUrl)?;
        let header =
            HeaderValue::from_str(authorization).map_err(|_| ProviderConnectError::BadApiKey)?;
        request.headers_mut().insert(AUTHORIZATION, header);

        let (mut socket, _response) =
            tungstenite::connect(request).map_err(|source| ProviderConnectError::Connect {
                url: url.to_string(),
                source: Box::new(source),
            })?;
        set_read_timeout(&mut socket).map_err(ProviderConnectError::SocketConfig)?;

        let mut channel = Self {
            socket,
            wire,
            remote_closed: false,
        };
        for message in channel.wire.open_messages() {
            channel
                .socket
                .send(message)
                .map_err(|e| ProviderConnectError::Open(Box::new(e)))?;
        }
        Ok(channel)
    }
}

fn set_read_timeout(socket: &mut WebSocket<MaybeTlsStream<TcpStream>>) -> std::io::Result<()> {
    match socket.get_mut() {
        MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(POLL_READ_TIMEOUT)),
        MaybeTlsStream::NativeTls(stream) => {
            stream.get_ref().set_read_timeout(Some(POLL_READ_TIMEOUT))
        }
        _ => Ok(()),
    }
}

fn is_poll_timeout(error: &tungstenite::Error) -> bool {
    matches!(
        error,
        tungstenite::Error::Io(e)
            if matches!(e.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
    )
}

impl TranscriptionChannel for WsTranscriptionChannel {
    fn send_audio(&mut self, chunk: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let message = self.wire.frame_audio(chunk);
        self.socket.send(message)?;
        Ok(())
    }

    fn poll_event(&mut self) -> Result<Option<Value>, Box<dyn std::error::Error>> {
        if self.remote_closed {
            return Ok(None);
        }
        loop {
            match self.socket.read() {
                Ok(Message::Text(text)) => match serde_json::from_str(&text) {
                    Ok(value) => return Ok(Some(value)),
                    Err(e) => {
                        // Malformed event: skip, never fail the session.
                        log::warn!("discarding unparseable provider event: {e}");
                    }
                },
                Ok(Message::Close(_)) => {
                    self.remote_closed = true;
                    return Ok(None);
                }
                // Binary and ping/pong frames carry no transcription.
                Ok(_) => {}
                Err(ref e) if is_poll_timeout(e) => return Ok(None),
                Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                    self.remote_closed = true;
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.remote_closed {
            return Ok(());
        }
        if let Some(message) = self.wire.close_message() {
            if let Err(e) = self.socket.send(message) {
                // The provider may already have closed its side; that is
                // not a benchmark failure.
                log::warn!("failed to send end-of-stream message: {e}");
            }
        }
        Ok(())
    }
}

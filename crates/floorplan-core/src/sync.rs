//! Project sync wire protocol and the native WebSocket transport.
//!
//! Every payload is a whole [`Project`] document encoded as JSON; there is no
//! delta or binary encoding.

use crate::model::Project;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Messages sent to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start receiving a project's document and its accepted writes
    Subscribe { project_id: String },
    /// Stop receiving updates for the current project
    Unsubscribe,
    /// Replace the project, if the server is still at `base_version`
    Write { project: Project, base_version: u64 },
}

/// Messages received from the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Current document, sent once on subscribe
    Snapshot { project: Project },
    /// A write was accepted; sent to every subscriber
    Update { project: Project },
    /// Your write was accepted at this version
    Accepted { version: u64 },
    /// Your write was stale; this is the authoritative document
    Conflict { project: Project },
    Error { message: String },
}

impl ClientMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ServerMessage {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// What the transport reports back to the sync manager.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    /// A text frame, to be handed to `ProjectSync::handle_message`
    Message(String),
    Error { message: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum TransportError {
    #[error("invalid WebSocket url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("already connected")]
    AlreadyConnected,
    #[error("not connected")]
    NotConnected,
}

mod native_client {
    use super::*;
    use std::io::ErrorKind;
    use std::net::TcpStream;
    use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tungstenite::stream::MaybeTlsStream;
    use tungstenite::{Message, WebSocket};
    use url::Url;

    type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

    /// How long a blocking read may wait before queued frames are flushed.
    const READ_POLL: Duration = Duration::from_millis(50);
    const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

    enum Outgoing {
        Frame(String),
        Close,
    }

    pub(super) fn parse_ws_url(url: &str) -> Result<Url, TransportError> {
        let invalid = |reason: String| TransportError::InvalidUrl {
            url: url.to_string(),
            reason,
        };
        let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        match parsed.scheme() {
            "ws" | "wss" => Ok(parsed),
            other => Err(invalid(format!("unsupported scheme {other}"))),
        }
    }

    /// Channels to a running socket worker.
    struct Link {
        outgoing: Sender<Outgoing>,
        incoming: Receiver<TransportEvent>,
        _worker: JoinHandle<()>,
    }

    /// Blocking tungstenite socket driven from a worker thread.
    ///
    /// The caller never waits on the network: frames are queued with
    /// [`send`](Self::send) and results are drained with
    /// [`poll_events`](Self::poll_events), typically once per frame of the
    /// interaction loop.
    pub struct NativeWebSocket {
        state: ConnectionState,
        link: Option<Link>,
    }

    impl NativeWebSocket {
        pub fn new() -> Self {
            Self {
                state: ConnectionState::Disconnected,
                link: None,
            }
        }

        /// Start connecting in the background. Completion arrives as
        /// [`TransportEvent::Connected`] or [`TransportEvent::Error`].
        pub fn connect(&mut self, url: &str) -> Result<(), TransportError> {
            if self.link.is_some() {
                return Err(TransportError::AlreadyConnected);
            }
            let url = parse_ws_url(url)?;

            let (out_tx, out_rx) = mpsc::channel();
            let (in_tx, in_rx) = mpsc::channel();
            let worker = thread::spawn(move || run(url, out_rx, in_tx));

            self.state = ConnectionState::Connecting;
            self.link = Some(Link {
                outgoing: out_tx,
                incoming: in_rx,
                _worker: worker,
            });
            Ok(())
        }

        /// Ask the worker to close the socket and forget it.
        pub fn disconnect(&mut self) {
            if let Some(link) = self.link.take() {
                let _ = link.outgoing.send(Outgoing::Close);
            }
            self.state = ConnectionState::Disconnected;
        }

        /// Queue a text frame.
        pub fn send(&self, text: &str) -> Result<(), TransportError> {
            let link = self.link.as_ref().ok_or(TransportError::NotConnected)?;
            link.outgoing
                .send(Outgoing::Frame(text.to_string()))
                .map_err(|_| TransportError::NotConnected)
        }

        /// Drain everything the worker reported since the last call.
        pub fn poll_events(&mut self) -> Vec<TransportEvent> {
            let Some(link) = &self.link else {
                return Vec::new();
            };
            let events: Vec<TransportEvent> = link.incoming.try_iter().collect();
            for event in &events {
                self.state = match event {
                    TransportEvent::Connected => ConnectionState::Connected,
                    TransportEvent::Disconnected => ConnectionState::Disconnected,
                    TransportEvent::Error { .. } => ConnectionState::Error,
                    TransportEvent::Message(_) => continue,
                };
            }
            events
        }

        pub fn state(&self) -> ConnectionState {
            self.state
        }

        pub fn is_connected(&self) -> bool {
            self.state == ConnectionState::Connected
        }
    }

    impl Default for NativeWebSocket {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Drop for NativeWebSocket {
        fn drop(&mut self) {
            self.disconnect();
        }
    }

    fn run(url: Url, outgoing: Receiver<Outgoing>, events: Sender<TransportEvent>) {
        log::info!("connecting to {url}");
        let mut socket = match tungstenite::connect(url.as_str()) {
            Ok((socket, response)) => {
                log::info!("connected to {url} ({})", response.status());
                socket
            }
            Err(e) => {
                log::error!("connection to {url} failed: {e}");
                let _ = events.send(TransportEvent::Error {
                    message: format!("connection failed: {e}"),
                });
                return;
            }
        };
        if let MaybeTlsStream::Plain(tcp) = socket.get_mut() {
            let _ = tcp.set_read_timeout(Some(READ_POLL));
            let _ = tcp.set_write_timeout(Some(WRITE_TIMEOUT));
        }
        let _ = events.send(TransportEvent::Connected);

        if let Err(message) = pump(&mut socket, &outgoing, &events) {
            log::error!("socket to {url} failed: {message}");
            let _ = events.send(TransportEvent::Error { message });
        }
        log::info!("socket to {url} closed");
        let _ = events.send(TransportEvent::Disconnected);
    }

    /// Alternate between flushing queued frames and reading one incoming
    /// frame until either side closes. `Err` carries a description of a
    /// network failure.
    fn pump(socket: &mut Socket, outgoing: &Receiver<Outgoing>, events: &Sender<TransportEvent>) -> Result<(), String> {
        loop {
            loop {
                match outgoing.try_recv() {
                    Ok(Outgoing::Frame(text)) => {
                        socket
                            .send(Message::Text(text))
                            .map_err(|e| format!("send failed: {e}"))?;
                    }
                    Ok(Outgoing::Close) | Err(TryRecvError::Disconnected) => {
                        let _ = socket.close(None);
                        let _ = socket.flush();
                        return Ok(());
                    }
                    Err(TryRecvError::Empty) => break,
                }
            }

            match socket.read() {
                Ok(Message::Text(text)) => {
                    if events.send(TransportEvent::Message(text)).is_err() {
                        return Ok(());
                    }
                }
                Ok(Message::Close(_)) => return Ok(()),
                // tungstenite answers pings itself on the next write/flush.
                Ok(_) => {}
                Err(tungstenite::Error::Io(e)) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    let _ = socket.flush();
                }
                Err(tungstenite::Error::ConnectionClosed) => return Ok(()),
                Err(e) => return Err(format!("read failed: {e}")),
            }
        }
    }
}

pub use native_client::NativeWebSocket;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_wire_format() {
        let json = ClientMessage::Subscribe {
            project_id: "p-1".to_string(),
        }
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"type":"subscribe","project_id":"p-1"}"#);
        assert_eq!(ClientMessage::Unsubscribe.to_json().unwrap(), r#"{"type":"unsubscribe"}"#);
    }

    #[test]
    fn test_write_carries_base_version() {
        let project = Project::with_id("p", "House");
        let json = ClientMessage::Write {
            project: project.clone(),
            base_version: 7,
        }
        .to_json()
        .unwrap();
        let back: ClientMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ClientMessage::Write { project, base_version: 7 });
    }

    #[test]
    fn test_server_replies_parse() {
        let msg: ServerMessage = serde_json::from_str(r#"{"type":"accepted","version":4}"#).unwrap();
        assert_eq!(msg, ServerMessage::Accepted { version: 4 });

        let msg: ServerMessage = serde_json::from_str(r#"{"type":"error","message":"bad"}"#).unwrap();
        assert!(matches!(msg, ServerMessage::Error { message } if message == "bad"));

        assert!(serde_json::from_str::<ServerMessage>(r#"{"type":"dance"}"#).is_err());
    }

    #[test]
    fn test_rejects_non_websocket_url() {
        assert!(native_client::parse_ws_url("ws://localhost:3030/ws").is_ok());
        assert!(matches!(
            native_client::parse_ws_url("http://localhost:3030/ws"),
            Err(TransportError::InvalidUrl { .. })
        ));
        assert!(native_client::parse_ws_url("not a url").is_err());

        let mut ws = NativeWebSocket::new();
        assert!(ws.connect("ftp://example.com").is_err());
        assert_eq!(ws.state(), ConnectionState::Disconnected);
        assert_eq!(ws.send("x"), Err(TransportError::NotConnected));
        assert!(ws.poll_events().is_empty());
    }
}

//! WebSocket network infrastructure.
//!
//! [`WsConnector`] opens connections in a background task and reports the
//! outcome on the supervisor's event channel. On success the stream is
//! split: the write half is boxed as a [`Transport`] and handed to the
//! supervisor inside the `Opened` event; the read half is driven by a
//! spawned read loop that forwards inbound text frames and reports closure.
//!
//! Every event carries the epoch of the attempt that produced it, so a
//! socket from an abandoned attempt can never be mistaken for the current
//! one.

pub mod mock;

use async_trait::async_trait;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

use crate::domain::event::{CloseCause, LinkEvent, TransportEvent};
use crate::domain::ports::{Connector, Transport, TransportError};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;

/// Opens WebSocket connections with `tokio_tungstenite::connect_async`.
#[derive(Debug, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn spawn_connect(&self, url: String, epoch: u64, events: mpsc::UnboundedSender<LinkEvent>) {
        tokio::spawn(async move {
            debug!(%url, epoch, "starting connect attempt");
            match connect_async(url.as_str()).await {
                Ok((ws_stream, _response)) => {
                    let (sink, stream) = ws_stream.split();
                    let transport: Box<dyn Transport> = Box::new(WsTransport { sink });
                    let _ = events.send(LinkEvent::Transport(TransportEvent::Opened {
                        epoch,
                        transport,
                    }));
                    read_loop(stream, epoch, events).await;
                }
                Err(e) => {
                    let _ = events.send(LinkEvent::Transport(TransportEvent::Closed {
                        epoch,
                        cause: CloseCause::ConnectFailed(e.to_string()),
                    }));
                }
            }
        });
    }
}

/// Write half of an open WebSocket connection.
pub struct WsTransport {
    sink: WsSink,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send_text(&mut self, frame: &str) -> Result<(), TransportError> {
        self.sink
            .send(WsMessage::Text(frame.to_string()))
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    async fn send_ping(&mut self) -> Result<(), TransportError> {
        self.sink
            .send(WsMessage::Ping(Vec::new()))
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    async fn close(&mut self) {
        // Best-effort close frame; the peer may already be gone.
        if let Err(e) = self.sink.send(WsMessage::Close(None)).await {
            debug!("close frame not sent: {e}");
        }
        let _ = self.sink.close().await;
    }
}

/// Drives the read half until the connection ends, then reports why.
///
/// Inbound text frames are forwarded as `TextReceived`; Ping/Pong frames are
/// transport chatter and only logged (tokio-tungstenite replies to Pings
/// automatically when the sink is flushed). Exactly one `Closed` event is
/// emitted, on exit.
async fn read_loop(
    mut stream: futures_util::stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    epoch: u64,
    events: mpsc::UnboundedSender<LinkEvent>,
) {
    let cause = loop {
        match stream.next().await {
            Some(Ok(WsMessage::Text(frame))) => {
                if events
                    .send(LinkEvent::Transport(TransportEvent::TextReceived { epoch, frame }))
                    .is_err()
                {
                    // Supervisor gone; nothing left to report to.
                    return;
                }
            }
            Some(Ok(WsMessage::Binary(_))) => {
                warn!("unexpected binary frame ignored");
            }
            Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => {
                debug!("transport liveness frame");
            }
            Some(Ok(WsMessage::Close(frame))) => {
                info!("server closed the connection");
                break match frame {
                    Some(f) if !f.reason.is_empty() => {
                        CloseCause::Closed { reason: f.reason.into_owned() }
                    }
                    _ => CloseCause::PeerClosed,
                };
            }
            Some(Ok(WsMessage::Frame(_))) => {
                debug!("raw frame ignored");
            }
            Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                break CloseCause::PeerClosed;
            }
            Some(Err(e)) => {
                break CloseCause::TransportError(e.to_string());
            }
            None => break CloseCause::PeerClosed,
        }
    };

    let _ = events.send(LinkEvent::Transport(TransportEvent::Closed { epoch, cause }));
}

//! Connection abstraction over one duplex WebSocket stream.
//!
//! The socket is split on construction: a writer task owns the sink and
//! drains an unbounded mpsc channel, so sending never waits on peer I/O.
//! The sender half doubles as the handle the broadcast registry stores;
//! any part of the system can push a frame to this client through it.

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one accepted socket. Compared by value, never by
/// message content; used for registry membership and broadcast exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The peer is gone: its writer task has stopped and the outbound
/// channel is closed.
#[derive(Debug, thiserror::Error)]
#[error("connection closed, peer is gone")]
pub struct SendError;

/// Outcome of one `receive` call. The session loop matches on this
/// instead of relying on unwinding.
#[derive(Debug)]
pub enum RecvOutcome {
    /// One inbound text frame.
    Message(String),
    /// Peer closed cleanly (Close frame or end of stream).
    Disconnected,
    /// Abnormal transport fault.
    Failed(axum::Error),
}

/// Cheap cloneable send handle: what the registry stores per member.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<Message>,
}

impl ConnectionHandle {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Enqueue one text frame for delivery. Fails iff the connection's
    /// writer task is gone. Never blocks, so it is safe to call while
    /// holding the registry lock.
    pub fn send(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.outbound
            .send(Message::Text(text.into().into()))
            .map_err(|_| SendError)
    }

    #[cfg(test)]
    pub(crate) fn for_test(id: u64, outbound: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id: ConnectionId(id),
            outbound,
        }
    }
}

/// One live duplex stream to a client. Owned by exactly one session task.
pub struct Connection {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<Message>,
    inbound: SplitStream<WebSocket>,
}

impl Connection {
    /// Wrap an upgraded socket. The handshake already succeeded: a
    /// rejected upgrade is answered by axum before any `Connection`
    /// exists.
    pub fn new(socket: WebSocket) -> Self {
        let (sink, inbound) = socket.split();
        let (outbound, rx) = mpsc::unbounded_channel::<Message>();
        // The writer exits on its own once the peer stops accepting
        // writes or every sender (session + registry) is dropped.
        tokio::spawn(writer_task(sink, rx));

        Self {
            id: ConnectionId::next(),
            outbound,
            inbound,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Handle for the registry (and anyone else) to push frames to this
    /// client.
    pub fn handle(&self) -> ConnectionHandle {
        ConnectionHandle {
            id: self.id,
            outbound: self.outbound.clone(),
        }
    }

    /// Deliver one text frame to the peer.
    pub fn send(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.outbound
            .send(Message::Text(text.into().into()))
            .map_err(|_| SendError)
    }

    /// Wait for the next inbound text frame. Control frames are absorbed
    /// here: client pings are answered with pongs, pongs and binary
    /// frames are skipped.
    pub async fn receive(&mut self) -> RecvOutcome {
        loop {
            match self.inbound.next().await {
                Some(Ok(Message::Text(text))) => {
                    return RecvOutcome::Message(text.to_string());
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(connection = %self.id, reason = ?frame, "close frame received");
                    return RecvOutcome::Disconnected;
                }
                Some(Ok(Message::Ping(data))) => {
                    // Writer may already be gone; the reader will see the
                    // stream end on its own.
                    let _ = self.outbound.send(Message::Pong(data));
                }
                Some(Ok(Message::Pong(_))) => {}
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!(
                        connection = %self.id,
                        bytes = data.len(),
                        "ignoring binary frame on text relay"
                    );
                }
                Some(Err(e)) => return RecvOutcome::Failed(e),
                None => return RecvOutcome::Disconnected,
            }
        }
    }

    /// Best-effort close. Idempotent: closing an already-closed
    /// connection is a no-op.
    pub fn close(self) {
        let _ = self.outbound.send(Message::Close(None));
        // Dropping our sender half lets the writer flush the close frame
        // and exit once every registry clone is gone too. We never wait
        // on the peer to acknowledge.
    }
}

/// Forwards queued frames to the socket sink until the channel closes or
/// the peer stops accepting writes.
async fn writer_task(mut sink: SplitSink<WebSocket, Message>, mut rx: mpsc::UnboundedReceiver<Message>) {
    while let Some(msg) = rx.recv().await {
        if sink.send(msg).await.is_err() {
            break;
        }
    }
}

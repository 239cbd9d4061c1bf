use notification::connection::{Connection, ConnectionId};
use notification::error::{CloseError, SendError};
use notification::message::{CloseReason, NotificationEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedSender;

/// Work queued for a socket's task.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Event(NotificationEvent),
    Close(CloseReason),
}

/// A subscriber's WebSocket, as seen by the hub.
///
/// Sends and closes only push onto the socket task's queue, so neither waits on
/// the network.
pub struct WebSocketConnection {
    id: ConnectionId,
    sender: UnboundedSender<Outbound>,
    closed: AtomicBool,
}

impl WebSocketConnection {
    pub fn new(id: ConnectionId, sender: UnboundedSender<Outbound>) -> Self {
        Self {
            id,
            sender,
            closed: AtomicBool::new(false),
        }
    }

    /// Called by the socket task once it stops serving the socket.
    pub fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Connection for WebSocketConnection {
    fn id(&self) -> &ConnectionId {
        &self.id
    }

    fn send(&self, event: &NotificationEvent) -> Result<(), SendError> {
        if self.is_closed() {
            return Err(SendError::Closed);
        }
        self.sender
            .send(Outbound::Event(event.clone()))
            .map_err(|_| SendError::Closed)
    }

    fn close(&self, reason: &CloseReason) -> Result<(), CloseError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(CloseError::AlreadyClosed);
        }
        self.sender
            .send(Outbound::Close(reason.clone()))
            .map_err(|_| CloseError::AlreadyClosed)
    }
}

use crate::connection::{Connection, ConnectionId};
use crate::error::{CloseError, SendError};
use crate::message::{CloseReason, NotificationEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory connection that records what the hub did to it.
pub(crate) struct RecordingConnection {
    id: ConnectionId,
    fail_sends: bool,
    fail_closes: bool,
    send_attempts: AtomicUsize,
    sent: Mutex<Vec<NotificationEvent>>,
    closes: Mutex<Vec<CloseReason>>,
}

impl RecordingConnection {
    pub(crate) fn new(id: &str) -> Arc<Self> {
        Self::build(id, false, false)
    }

    /// Every send fails as if the socket were already gone.
    pub(crate) fn broken(id: &str) -> Arc<Self> {
        Self::build(id, true, false)
    }

    /// Every close fails with a transport error.
    pub(crate) fn unclosable(id: &str) -> Arc<Self> {
        Self::build(id, false, true)
    }

    fn build(id: &str, fail_sends: bool, fail_closes: bool) -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::from(id),
            fail_sends,
            fail_closes,
            send_attempts: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            closes: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn sent(&self) -> Vec<NotificationEvent> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> Vec<CloseReason> {
        self.closes.lock().unwrap().clone()
    }
}

impl Connection for RecordingConnection {
    fn id(&self) -> &ConnectionId {
        &self.id
    }

    fn send(&self, event: &NotificationEvent) -> Result<(), SendError> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_sends {
            return Err(SendError::Closed);
        }
        self.sent.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn close(&self, reason: &CloseReason) -> Result<(), CloseError> {
        self.closes.lock().unwrap().push(reason.clone());
        if self.fail_closes {
            return Err(CloseError::Transport("broken pipe".to_string()));
        }
        Ok(())
    }
}

use events::{JobStatus, PrintJob};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Message sent with every close issued by the shutdown path.
pub const SHUTDOWN_MESSAGE: &str = "The printer host has been asked to shut down now!";

/// An encoded payload ready to be relayed verbatim to subscribers.
///
/// Encoding happens once per publish; every member of a channel receives a
/// clone of the same shared buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent(Arc<str>);

impl NotificationEvent {
    /// Encode any serializable value using the wire encoding (JSON).
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(value)?;
        Ok(Self(Arc::from(json)))
    }

    pub fn from_job(job: &PrintJob) -> Result<Self, serde_json::Error> {
        Self::encode(job)
    }

    /// The synthesized event sent when a job file finishes uploading.
    pub fn ready(file_name: &str) -> Result<Self, serde_json::Error> {
        Self::from_job(&PrintJob::new(file_name, JobStatus::Ready))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// WebSocket close codes (RFC 6455 section 7.4.1) used by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseCode {
    NormalClosure,
}

impl CloseCode {
    pub fn code(&self) -> u16 {
        match self {
            CloseCode::NormalClosure => 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReason {
    pub code: CloseCode,
    pub message: String,
}

impl CloseReason {
    pub fn new(code: CloseCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn shutdown() -> Self {
        Self::new(CloseCode::NormalClosure, SHUTDOWN_MESSAGE)
    }
}

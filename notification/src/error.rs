//! Error types for the notification hub.
//!
//! Only [`DeploymentError`] ever reaches a caller. [`SendError`] and
//! [`CloseError`] are produced by individual [`Connection`](crate::connection::Connection)s
//! and are logged and swallowed by the hub so that one broken subscriber never
//! affects the others.

use std::fmt;

/// The hosting container refused to install an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentError {
    pub path: String,
    pub reason: String,
}

impl DeploymentError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DeploymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Couldn't deploy endpoint {}: {}", self.path, self.reason)
    }
}

impl std::error::Error for DeploymentError {}

/// A single send to a single connection could not be handed to its transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The connection's transport task is gone.
    Closed,
    /// The transport reported a failure.
    Transport(String),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Closed => write!(f, "connection is closed"),
            SendError::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

impl std::error::Error for SendError {}

/// A connection could not be closed during shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseError {
    AlreadyClosed,
    Transport(String),
}

impl fmt::Display for CloseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseError::AlreadyClosed => write!(f, "connection was already closed"),
            CloseError::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

impl std::error::Error for CloseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_error_display_names_the_path() {
        let err = DeploymentError::new("/printjobnotification/:job_name", "duplicate path");
        assert_eq!(
            err.to_string(),
            "Couldn't deploy endpoint /printjobnotification/:job_name: duplicate path"
        );
    }

    #[test]
    fn test_send_and_close_error_display() {
        assert_eq!(SendError::Closed.to_string(), "connection is closed");
        assert_eq!(
            CloseError::Transport("broken pipe".to_string()).to_string(),
            "transport error: broken pipe"
        );
    }
}

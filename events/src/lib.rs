//! Event system infrastructure for the print job notification hub.
//!
//! This crate provides the event system that decouples the parts of the host
//! that compute job state (print engine, upload pipeline) from the parts that
//! tell remote clients about it (the WebSocket notifier).
//!
//! # Architecture
//!
//! - **PrintJob / Printer / JobStatus**: the payload types external collaborators
//!   hand to the notifier
//! - **JobEvent**: Enum representing every change a notifier can be told about
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on other internal crates, avoiding circular
//! dependencies.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// The lifecycle states a print job reports to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Ready,
    Printing,
    Paused,
    Cancelling,
    Cancelled,
    Completed,
    Failed,
    Deleted,
}

/// A snapshot of a print job as it is relayed to subscribers.
///
/// `file_name` doubles as the job's subscription key: clients subscribe to
/// `/printjobnotification/{file_name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    pub file_name: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub printer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_slice: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_slices: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_time_ms: Option<u64>,
}

impl PrintJob {
    pub fn new(file_name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            file_name: file_name.into(),
            status,
            printer_name: None,
            current_slice: None,
            total_slices: None,
            elapsed_time_ms: None,
        }
    }
}

/// The device a job is running on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Printer {
    pub name: String,
}

impl Printer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Events that represent changes subscribers may care about.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// A job's status snapshot changed (slice advanced, paused, finished, ...).
    JobChanged { printer: Printer, job: PrintJob },
    /// A printer's own state changed.
    PrinterChanged { printer: Printer },
    /// A job file finished uploading and is ready to print.
    FileUploadComplete { file: PathBuf },
}

/// Trait for handling job events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &JobEvent);
}

/// Publishes job events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers, in registration order.
    pub async fn publish(&self, event: JobEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

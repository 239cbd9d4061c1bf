//! Per-job WebSocket notification hub.
//!
//! Remote clients subscribe to one print job by opening a connection on
//! `/printjobnotification/{job_name}`. Every status change for that job is then
//! relayed, verbatim, to every client currently subscribed to it.
//!
//! # Architecture
//!
//! - **Two-level registry**: a `DashMap` of job id to job channel, each channel a
//!   `DashMap` of connection id to connection. Channels are created lazily and
//!   atomically on first subscription and are kept for the process lifetime.
//! - **Fire-and-forget fan-out**: `NotificationHub::publish` snapshots a channel
//!   and attempts one non-blocking send per member. A failing member is logged
//!   and skipped; only its own close/error callback unregisters it.
//! - **Transport-agnostic**: connections and the hosting container are traits,
//!   so the hub runs (and is tested) without a network. The `web` crate
//!   provides the axum WebSocket implementations.
//! - **Ephemeral events**: nothing is stored or replayed; a client that
//!   subscribes late sees only later changes.
//!
//! # Modules
//!
//! - `connection`: `JobId`, `ConnectionId`, the `Connection` trait and `ConnectionRegistry`
//! - `manager`: `NotificationHub` fan-out
//! - `lifecycle`: open/close/error callbacks and upload-complete events
//! - `shutdown`: one-shot close of every live connection
//! - `notifier`: the `Notifier` role, `EndpointContainer` and `WebSocketPrintJobNotifier`
//! - `domain_event_handler`: routes `events::JobEvent`s to a `Notifier`
//! - `message`: encoded events and close reasons
//! - `error`: deployment, send and close errors

pub mod connection;
pub mod domain_event_handler;
pub mod error;
pub mod lifecycle;
pub mod manager;
pub mod message;
pub mod notifier;
pub mod shutdown;

#[cfg(test)]
pub(crate) mod test_support;

pub use manager::NotificationHub;
pub use notifier::{Notifier, WebSocketPrintJobNotifier};

//! WebSocket transport for the notification hub.
//!
//! The hub itself lives in the `notification` crate and only knows the
//! `Connection` and `EndpointContainer` traits; this module provides the axum
//! implementations of both.

pub mod connection;
pub mod container;
pub(crate) mod handler;

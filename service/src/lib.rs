//! Process-level concerns shared by the binary and the web host: command line
//! and environment configuration, and logger setup.

pub mod config;
pub mod logging;

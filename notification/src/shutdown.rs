use crate::connection::{Connection, ConnectionId, ConnectionRegistry};
use crate::message::CloseReason;
use log::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownSummary {
    pub closed: usize,
    pub failed: usize,
}

/// Closes every live connection once, at process teardown.
pub struct ShutdownController {
    registry: Arc<ConnectionRegistry>,
    stopped: AtomicBool,
}

impl ShutdownController {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            registry,
            stopped: AtomicBool::new(false),
        }
    }

    /// Best-effort close of every registered connection with the shutdown
    /// reason. Only the first call does anything.
    ///
    /// Connections are not unregistered here; each transport removes its own
    /// connection when the close completes.
    pub fn stop(&self) -> ShutdownSummary {
        if self.stopped.swap(true, Ordering::SeqCst) {
            warn!("Shutdown already ran, ignoring repeated stop");
            return ShutdownSummary::default();
        }

        let reason = CloseReason::shutdown();
        let channels = self.registry.channels();
        info!(
            "Closing connections across {} job channel(s)",
            channels.len()
        );

        let mut summary = ShutdownSummary::default();
        let mut seen: HashSet<ConnectionId> = HashSet::new();
        for (job_id, members) in channels {
            for connection in members {
                if !seen.insert(connection.id().clone()) {
                    continue;
                }
                match connection.close(&reason) {
                    Ok(()) => summary.closed += 1,
                    Err(e) => {
                        summary.failed += 1;
                        warn!(
                            "Failed to close connection {} for job {}: {}",
                            connection.id(),
                            job_id,
                            e
                        );
                    }
                }
            }
        }

        info!(
            "Shutdown closed {} connection(s), {} failed",
            summary.closed, summary.failed
        );
        summary
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Close a connection that registered once `stop` had already run.
    ///
    /// It may also have made it into the `stop` snapshot, in which case the
    /// transport reports it as already closed.
    pub fn close_late_arrival(&self, connection: &dyn Connection) {
        match connection.close(&CloseReason::shutdown()) {
            Ok(()) => info!(
                "Closed connection {} that opened during shutdown",
                connection.id()
            ),
            Err(e) => debug!(
                "Connection {} opened during shutdown was not closed again: {}",
                connection.id(),
                e
            ),
        }
    }
}

use crate::connection::{ConnectionRegistry, JobId};
use crate::message::NotificationEvent;
use events::PrintJob;
use log::*;
use std::sync::Arc;

/// Outcome of one publish call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Members a send was attempted to.
    pub attempted: usize,
    /// Attempts the connection rejected.
    pub failed: usize,
}

/// Fans published events out to every connection subscribed to a job.
pub struct NotificationHub {
    registry: Arc<ConnectionRegistry>,
}

impl NotificationHub {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Send `event` once to every current member of `job_id`'s channel.
    ///
    /// A failed send is logged and skipped; the failing connection stays
    /// registered until its own close or error callback removes it.
    pub fn publish(&self, job_id: &JobId, event: &NotificationEvent) -> Delivery {
        let members = self.registry.channel_for(job_id);
        if members.is_empty() {
            debug!("No subscribers for job {job_id}, dropping event");
            return Delivery::default();
        }

        let mut delivery = Delivery::default();
        for connection in members {
            delivery.attempted += 1;
            if let Err(e) = connection.send(event) {
                delivery.failed += 1;
                warn!(
                    "Failed to send event for job {} to connection {}: {}",
                    job_id,
                    connection.id(),
                    e
                );
            }
        }

        debug!(
            "Published event for job {}: {} attempted, {} failed",
            job_id, delivery.attempted, delivery.failed
        );
        delivery
    }

    /// Encode `job` and publish it to the channel named by the final
    /// component of its file name.
    pub fn publish_job(&self, job: &PrintJob) -> Delivery {
        let event = match NotificationEvent::from_job(job) {
            Ok(event) => event,
            Err(e) => {
                error!("Failed to serialize print job {}: {e}", job.file_name);
                return Delivery::default();
            }
        };

        self.publish(&JobId::from_file_name(&job.file_name), &event)
    }
}

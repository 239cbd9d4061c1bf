use crate::connection::{Connection, ConnectionRegistry, JobId};
use crate::manager::{Delivery, NotificationHub};
use crate::message::NotificationEvent;
use crate::shutdown::ShutdownController;
use log::*;
use std::error::Error as StdError;
use std::path::Path;
use std::sync::Arc;

/// Translates transport callbacks into registry operations.
///
/// The hosting container calls these from each connection's own task.
pub struct LifecycleBinding {
    registry: Arc<ConnectionRegistry>,
    hub: Arc<NotificationHub>,
    shutdown: Arc<ShutdownController>,
}

impl LifecycleBinding {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        hub: Arc<NotificationHub>,
        shutdown: Arc<ShutdownController>,
    ) -> Self {
        Self {
            registry,
            hub,
            shutdown,
        }
    }

    pub fn on_open(&self, connection: Arc<dyn Connection>, job_id: JobId) {
        let connection_id = connection.id().clone();
        info!("Connection {connection_id} subscribed to job {job_id}");
        self.registry
            .register(job_id, connection_id, Arc::clone(&connection));

        // Registration happens before the flag is read, so a connection that
        // the shutdown snapshot missed is always seen here.
        if self.shutdown.is_stopped() {
            self.shutdown.close_late_arrival(connection.as_ref());
        }
    }

    pub fn on_close(&self, connection: &dyn Connection, job_id: &JobId) {
        info!("Connection {} unsubscribed from job {job_id}", connection.id());
        self.registry.unregister(job_id, connection.id());
    }

    /// The job id is not trusted on the error path, so the connection is
    /// purged from every channel.
    pub fn on_error(&self, connection: &dyn Connection, cause: &dyn StdError) {
        let removed = self.registry.remove_everywhere(connection.id());
        warn!(
            "Connection {} failed: {cause}. Removed from {removed} job channel(s)",
            connection.id()
        );
    }

    /// Tell subscribers of the uploaded file's job that it is ready to print.
    pub fn file_upload_complete(&self, file: &Path) -> Delivery {
        let Some(file_name) = file.file_name().and_then(|name| name.to_str()) else {
            warn!("Ignoring upload completion for path without a file name: {file:?}");
            return Delivery::default();
        };

        let event = match NotificationEvent::ready(file_name) {
            Ok(event) => event,
            Err(e) => {
                error!("Failed to serialize ready event for {file_name}: {e}");
                return Delivery::default();
            }
        };

        self.hub.publish(&JobId::from_file_name(file_name), &event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SendError;
    use crate::message::CloseReason;
    use crate::test_support::RecordingConnection;
    use serde_json::{json, Value};

    fn binding() -> (Arc<ConnectionRegistry>, LifecycleBinding) {
        let (registry, _shutdown, binding) = binding_with_shutdown();
        (registry, binding)
    }

    fn binding_with_shutdown() -> (
        Arc<ConnectionRegistry>,
        Arc<ShutdownController>,
        LifecycleBinding,
    ) {
        let registry = Arc::new(ConnectionRegistry::new());
        let hub = Arc::new(NotificationHub::new(Arc::clone(&registry)));
        let shutdown = Arc::new(ShutdownController::new(Arc::clone(&registry)));
        let binding = LifecycleBinding::new(Arc::clone(&registry), hub, Arc::clone(&shutdown));
        (registry, shutdown, binding)
    }

    #[test]
    fn test_open_then_close_round_trips_membership() {
        let (registry, binding) = binding();
        let a = RecordingConnection::new("a");
        let job = JobId::from("job1");

        binding.on_open(a.clone(), job.clone());
        assert!(registry.contains(&job, a.id()));

        binding.on_close(a.as_ref(), &job);
        assert!(!registry.contains(&job, a.id()));
        assert_eq!(registry.channel_count(), 1);
    }

    #[test]
    fn test_close_for_unknown_job_is_harmless() {
        let (registry, binding) = binding();
        let a = RecordingConnection::new("a");
        binding.on_close(a.as_ref(), &JobId::from("never-opened"));
        assert_eq!(registry.connection_count(), 0);
    }

    #[test]
    fn test_error_removes_connection_from_all_channels() {
        let (registry, binding) = binding();
        let a = RecordingConnection::new("a");
        let b = RecordingConnection::new("b");
        binding.on_open(a.clone(), JobId::from("job1"));
        binding.on_open(a.clone(), JobId::from("job2"));
        binding.on_open(b.clone(), JobId::from("job2"));

        binding.on_error(a.as_ref(), &SendError::Transport("reset by peer".to_string()));

        assert_eq!(registry.connection_count(), 1);
        assert!(registry.contains(&JobId::from("job2"), b.id()));
    }

    #[test]
    fn test_file_upload_complete_sends_ready_event_to_file_subscribers() {
        let (_registry, binding) = binding();
        let a = RecordingConnection::new("a");
        let other = RecordingConnection::new("other");
        binding.on_open(a.clone(), JobId::from("model.stl"));
        binding.on_open(other.clone(), JobId::from("other.stl"));

        let delivery = binding.file_upload_complete(Path::new("/uploads/model.stl"));

        assert_eq!(delivery.attempted, 1);
        let sent = a.sent();
        assert_eq!(sent.len(), 1);
        let value: Value = serde_json::from_str(sent[0].as_str()).unwrap();
        assert_eq!(value, json!({"fileName": "model.stl", "status": "Ready"}));
        assert!(other.sent().is_empty());
    }

    #[test]
    fn test_file_upload_complete_without_file_name_sends_nothing() {
        let (_registry, binding) = binding();
        let delivery = binding.file_upload_complete(Path::new("/"));
        assert_eq!(delivery, Delivery::default());
    }

    #[test]
    fn test_connection_opened_after_stop_is_closed() {
        let (registry, shutdown, binding) = binding_with_shutdown();
        let early = RecordingConnection::new("early");
        binding.on_open(early.clone(), JobId::from("job1"));

        shutdown.stop();
        let late = RecordingConnection::new("late");
        binding.on_open(late.clone(), JobId::from("job1"));

        assert_eq!(early.closes(), vec![CloseReason::shutdown()]);
        assert_eq!(late.closes(), vec![CloseReason::shutdown()]);
        assert!(registry.contains(&JobId::from("job1"), late.id()));
    }

    #[test]
    fn test_connection_opened_before_stop_is_not_closed_on_open() {
        let (_registry, binding) = binding();
        let a = RecordingConnection::new("a");
        binding.on_open(a.clone(), JobId::from("job1"));
        assert!(a.closes().is_empty());
    }
}

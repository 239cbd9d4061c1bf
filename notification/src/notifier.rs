use crate::connection::ConnectionRegistry;
use crate::error::DeploymentError;
use crate::lifecycle::LifecycleBinding;
use crate::manager::NotificationHub;
use crate::shutdown::{ShutdownController, ShutdownSummary};
use events::{PrintJob, Printer};
use log::*;
use std::path::Path;
use std::sync::Arc;

/// Route template clients connect to; `:job_name` is the job's file name.
pub const PRINT_JOB_NOTIFICATION_PATH: &str = "/printjobnotification/:job_name";

/// Name of the path segment carrying the job id.
pub const JOB_NAME_PARAM: &str = "job_name";

/// An endpoint this hub asks the hosting container to serve.
#[derive(Clone)]
pub struct Endpoint {
    pub path: String,
    pub lifecycle: Arc<LifecycleBinding>,
}

/// A host that can install endpoints, and may refuse to.
pub trait EndpointContainer {
    fn add_endpoint(&mut self, endpoint: Endpoint) -> Result<(), DeploymentError>;
}

/// Something the rest of the host tells about job, printer and upload changes.
pub trait Notifier: Send + Sync {
    /// Install this notifier's endpoint into `container`.
    fn register(&self, container: &mut dyn EndpointContainer) -> Result<(), DeploymentError>;

    fn job_changed(&self, printer: &Printer, job: &PrintJob);

    fn printer_changed(&self, printer: &Printer);

    fn file_upload_complete(&self, file: &Path);

    /// Close every subscriber. Runs at most once.
    fn stop(&self);
}

/// Relays print job status to WebSocket subscribers of that job.
pub struct WebSocketPrintJobNotifier {
    registry: Arc<ConnectionRegistry>,
    hub: Arc<NotificationHub>,
    lifecycle: Arc<LifecycleBinding>,
    shutdown: Arc<ShutdownController>,
}

impl WebSocketPrintJobNotifier {
    pub fn new() -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let hub = Arc::new(NotificationHub::new(Arc::clone(&registry)));
        let shutdown = Arc::new(ShutdownController::new(Arc::clone(&registry)));
        let lifecycle = Arc::new(LifecycleBinding::new(
            Arc::clone(&registry),
            Arc::clone(&hub),
            Arc::clone(&shutdown),
        ));

        Self {
            registry,
            hub,
            lifecycle,
            shutdown,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn hub(&self) -> &Arc<NotificationHub> {
        &self.hub
    }

    pub fn lifecycle(&self) -> &Arc<LifecycleBinding> {
        &self.lifecycle
    }

    /// Like [`Notifier::stop`], but reports what happened.
    pub fn shutdown(&self) -> ShutdownSummary {
        info!(
            "Stopping print job notifier: {} job channel(s), {} subscription(s)",
            self.registry.channel_count(),
            self.registry.connection_count()
        );
        self.shutdown.stop()
    }
}

impl Default for WebSocketPrintJobNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for WebSocketPrintJobNotifier {
    fn register(&self, container: &mut dyn EndpointContainer) -> Result<(), DeploymentError> {
        container.add_endpoint(Endpoint {
            path: PRINT_JOB_NOTIFICATION_PATH.to_string(),
            lifecycle: Arc::clone(&self.lifecycle),
        })?;
        info!("Registered print job notification endpoint {PRINT_JOB_NOTIFICATION_PATH}");
        Ok(())
    }

    fn job_changed(&self, printer: &Printer, job: &PrintJob) {
        debug!(
            "Job {} on printer {} changed to {:?}",
            job.file_name, printer.name, job.status
        );
        self.hub.publish_job(job);
    }

    fn printer_changed(&self, _printer: &Printer) {}

    fn file_upload_complete(&self, file: &Path) {
        self.lifecycle.file_upload_complete(file);
    }

    fn stop(&self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Connection, JobId};
    use crate::message::{CloseCode, SHUTDOWN_MESSAGE};
    use crate::test_support::RecordingConnection;
    use events::JobStatus;
    use serde_json::{json, Value};

    #[derive(Default)]
    struct FakeContainer {
        paths: Vec<String>,
        reject: bool,
    }

    impl EndpointContainer for FakeContainer {
        fn add_endpoint(&mut self, endpoint: Endpoint) -> Result<(), DeploymentError> {
            if self.reject {
                return Err(DeploymentError::new(endpoint.path, "container is sealed"));
            }
            self.paths.push(endpoint.path);
            Ok(())
        }
    }

    fn decode(conn: &RecordingConnection) -> Vec<Value> {
        conn.sent()
            .iter()
            .map(|event| serde_json::from_str(event.as_str()).unwrap())
            .collect()
    }

    #[test]
    fn test_register_installs_notification_endpoint() {
        let notifier = WebSocketPrintJobNotifier::new();
        let mut container = FakeContainer::default();

        notifier.register(&mut container).unwrap();

        assert_eq!(container.paths, vec![PRINT_JOB_NOTIFICATION_PATH.to_string()]);
    }

    #[test]
    fn test_register_surfaces_container_rejection() {
        let notifier = WebSocketPrintJobNotifier::new();
        let mut container = FakeContainer {
            reject: true,
            ..Default::default()
        };

        let err = notifier.register(&mut container).unwrap_err();
        assert_eq!(err.path, PRINT_JOB_NOTIFICATION_PATH);
    }

    #[test]
    fn test_scenario_single_subscriber_receives_status() {
        let notifier = WebSocketPrintJobNotifier::new();
        let a = RecordingConnection::new("a");
        notifier.lifecycle().on_open(a.clone(), JobId::from("job1"));

        notifier.job_changed(
            &Printer::new("photon"),
            &PrintJob::new("job1", JobStatus::Printing),
        );

        assert_eq!(
            decode(&a),
            vec![json!({"fileName": "job1", "status": "Printing"})]
        );
    }

    #[test]
    fn test_job_and_upload_events_share_the_bare_file_name_channel() {
        let notifier = WebSocketPrintJobNotifier::new();
        let a = RecordingConnection::new("a");
        notifier.lifecycle().on_open(a.clone(), JobId::from("model.stl"));

        notifier.file_upload_complete(Path::new("uploads/model.stl"));
        notifier.job_changed(
            &Printer::new("photon"),
            &PrintJob::new("uploads/model.stl", JobStatus::Printing),
        );

        assert_eq!(
            decode(&a),
            vec![
                json!({"fileName": "model.stl", "status": "Ready"}),
                json!({"fileName": "uploads/model.stl", "status": "Printing"}),
            ]
        );
    }

    #[test]
    fn test_scenario_two_subscribers_each_receive_one_copy() {
        let notifier = WebSocketPrintJobNotifier::new();
        let a = RecordingConnection::new("a");
        let b = RecordingConnection::new("b");
        notifier.lifecycle().on_open(a.clone(), JobId::from("job1"));
        notifier.lifecycle().on_open(b.clone(), JobId::from("job1"));

        notifier.job_changed(
            &Printer::new("photon"),
            &PrintJob::new("job1", JobStatus::Printing),
        );

        assert_eq!(a.sent().len(), 1);
        assert_eq!(b.sent().len(), 1);
    }

    #[test]
    fn test_scenario_closed_subscriber_gets_nothing() {
        let notifier = WebSocketPrintJobNotifier::new();
        let a = RecordingConnection::new("a");
        let job = JobId::from("job1");
        notifier.lifecycle().on_open(a.clone(), job.clone());
        notifier.lifecycle().on_close(a.as_ref(), &job);

        notifier.job_changed(
            &Printer::new("photon"),
            &PrintJob::new("job1", JobStatus::Printing),
        );

        assert_eq!(a.send_attempts(), 0);
    }

    #[test]
    fn test_scenario_upload_complete_synthesizes_ready_event() {
        let notifier = WebSocketPrintJobNotifier::new();
        let a = RecordingConnection::new("a");
        notifier.lifecycle().on_open(a.clone(), JobId::from("model.stl"));

        notifier.file_upload_complete(Path::new("uploads/model.stl"));

        assert_eq!(
            decode(&a),
            vec![json!({"fileName": "model.stl", "status": "Ready"})]
        );
    }

    #[test]
    fn test_scenario_stop_closes_all_clients_once() {
        let notifier = WebSocketPrintJobNotifier::new();
        let a = RecordingConnection::new("a");
        let b = RecordingConnection::new("b");
        let c = RecordingConnection::new("c");
        notifier.lifecycle().on_open(a.clone(), JobId::from("job1"));
        notifier.lifecycle().on_open(b.clone(), JobId::from("job1"));
        notifier.lifecycle().on_open(c.clone(), JobId::from("job2"));

        notifier.stop();
        notifier.stop();

        for conn in [&a, &b, &c] {
            let closes = conn.closes();
            assert_eq!(closes.len(), 1, "connection {} closed once", conn.id());
            assert_eq!(closes[0].code, CloseCode::NormalClosure);
            assert_eq!(closes[0].message, SHUTDOWN_MESSAGE);
        }
    }

    #[test]
    fn test_printer_changed_sends_nothing() {
        let notifier = WebSocketPrintJobNotifier::new();
        let a = RecordingConnection::new("a");
        notifier.lifecycle().on_open(a.clone(), JobId::from("photon"));

        notifier.printer_changed(&Printer::new("photon"));

        assert_eq!(a.send_attempts(), 0);
    }

    #[test]
    fn test_notifiers_do_not_share_subscribers() {
        let first = WebSocketPrintJobNotifier::new();
        let second = WebSocketPrintJobNotifier::new();
        let a = RecordingConnection::new("a");
        first.lifecycle().on_open(a.clone(), JobId::from("job1"));

        second.job_changed(
            &Printer::new("photon"),
            &PrintJob::new("job1", JobStatus::Printing),
        );

        assert_eq!(a.send_attempts(), 0);
        assert_eq!(second.registry().connection_count(), 0);
    }
}

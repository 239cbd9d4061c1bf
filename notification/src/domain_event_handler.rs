use crate::notifier::Notifier;
use async_trait::async_trait;
use events::{EventHandler, JobEvent};
use log::*;
use std::sync::Arc;

/// Routes job events from the [`events::EventPublisher`] to a [`Notifier`].
///
/// This lets the print engine and the upload pipeline publish through one
/// publisher without knowing which notifiers are installed.
pub struct NotifierEventHandler {
    notifier: Arc<dyn Notifier>,
}

impl NotifierEventHandler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl EventHandler for NotifierEventHandler {
    async fn handle(&self, event: &JobEvent) {
        match event {
            JobEvent::JobChanged { printer, job } => {
                debug!("Handling JobChanged event for job {}", job.file_name);
                self.notifier.job_changed(printer, job);
            }

            JobEvent::PrinterChanged { printer } => {
                debug!("Handling PrinterChanged event for printer {}", printer.name);
                self.notifier.printer_changed(printer);
            }

            JobEvent::FileUploadComplete { file } => {
                debug!("Handling FileUploadComplete event for {}", file.display());
                self.notifier.file_upload_complete(file);
            }
        }
    }
}

//! HTTP and WebSocket host for the print job notification hub.
//!
//! Serves the notifier's subscription endpoint, a health probe, and trigger
//! routes that let out-of-process collaborators publish job events.

use events::EventPublisher;
use log::*;
use notification::domain_event_handler::NotifierEventHandler;
use notification::notifier::Notifier;
use notification::WebSocketPrintJobNotifier;
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use ws::container::RouterContainer;

mod controller;
mod error;
pub mod router;
pub mod ws;

pub use error::{Error, Result};

/// How long `serve` waits for socket tasks to flush their close frames.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub notifier: Arc<WebSocketPrintJobNotifier>,
    pub event_publisher: Arc<EventPublisher>,
}

impl AppState {
    /// Wires an event publisher that routes every job event to `notifier`.
    pub fn new(config: Config, notifier: Arc<WebSocketPrintJobNotifier>) -> Self {
        let handler_notifier: Arc<dyn Notifier> = notifier.clone();
        let event_publisher = EventPublisher::new()
            .with_handler(Arc::new(NotifierEventHandler::new(handler_notifier)));

        Self {
            config,
            notifier,
            event_publisher: Arc::new(event_publisher),
        }
    }
}

/// Installs the notifier's endpoint and builds the full router.
pub fn build_app(app_state: AppState) -> Result<axum::Router> {
    let mut container = RouterContainer::new();
    app_state.notifier.register(&mut container)?;
    Ok(router::define_routes(app_state, container))
}

/// Serves `listener` until `shutdown` resolves, then closes every subscriber.
///
/// Upgraded sockets are not tracked by axum's graceful shutdown, so the
/// notifier is stopped as soon as the signal arrives and `serve` returns only
/// once every socket task has sent its close frame and unregistered, or
/// after a timeout.
pub async fn serve<F>(app_state: AppState, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let notifier = Arc::clone(&app_state.notifier);
    let stopping = Arc::clone(&notifier);
    let app = build_app(app_state)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Shutdown requested, closing subscriber connections");
            stopping.stop();
        })
        .await?;

    drain_subscriptions(&notifier, SHUTDOWN_DRAIN_TIMEOUT).await;
    Ok(())
}

async fn drain_subscriptions(notifier: &WebSocketPrintJobNotifier, timeout: Duration) {
    let drained = tokio::time::timeout(timeout, async {
        while notifier.registry().connection_count() > 0 {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await;

    match drained {
        Ok(()) => info!("All subscriber connections closed"),
        Err(_) => warn!(
            "Gave up waiting on {} subscriber connection(s) after {:?}",
            notifier.registry().connection_count(),
            timeout
        ),
    }
}

pub async fn init_server(app_state: AppState) -> Result<()> {
    let address = app_state.config.bind_address();
    let listener = TcpListener::bind(&address).await?;

    info!("Server starting... listening for connections on http://{address}");

    serve(app_state, listener, shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

use log::*;
use notification::WebSocketPrintJobNotifier;
use service::{config::Config, logging::Logger};
use std::sync::Arc;
use web::AppState;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        std::process::exit(1);
    }

    info!(
        "Starting print job notification hub [{}]",
        config.runtime_env()
    );

    let notifier = Arc::new(WebSocketPrintJobNotifier::new());
    let app_state = AppState::new(config, Arc::clone(&notifier));

    if let Err(e) = web::init_server(app_state).await {
        error!("Server terminated with an error: {e}");
        std::process::exit(1);
    }

    info!("Print job notification hub stopped");
}

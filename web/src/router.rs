use crate::controller::{health_check_controller, job_controller};
use crate::ws::container::RouterContainer;
use crate::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn define_routes(app_state: AppState, container: RouterContainer) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(job_routes(app_state))
        .merge(container.into_router())
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

/// Entry points for the print engine and upload pipeline when they run out
/// of process.
fn job_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/jobs/:job_name", put(job_controller::update))
        .route(
            "/uploads/:file_name/complete",
            post(job_controller::upload_complete),
        )
        .with_state(app_state)
}

use super::handler;
use axum::routing::get;
use axum::Router;
use log::*;
use notification::error::DeploymentError;
use notification::notifier::{Endpoint, EndpointContainer, JOB_NAME_PARAM};

/// Collects notification endpoints and serves them as axum WebSocket routes.
#[derive(Default)]
pub struct RouterContainer {
    endpoints: Vec<Endpoint>,
}

impl RouterContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.endpoints
            .iter()
            .map(|endpoint| endpoint.path.as_str())
            .collect()
    }

    /// One WebSocket route per accepted endpoint.
    pub fn into_router(self) -> Router {
        self.endpoints
            .into_iter()
            .fold(Router::new(), |router, endpoint| {
                router.merge(
                    Router::new()
                        .route(&endpoint.path, get(handler::subscribe))
                        .with_state(endpoint.lifecycle),
                )
            })
    }

    fn validate(&self, path: &str) -> Result<(), String> {
        if !path.starts_with('/') {
            return Err("path must start with '/'".to_string());
        }

        let job_segment = format!(":{JOB_NAME_PARAM}");
        if !path.split('/').any(|segment| segment == job_segment) {
            return Err(format!("path must contain a {job_segment} segment"));
        }

        if self.endpoints.iter().any(|endpoint| endpoint.path == path) {
            return Err("path is already registered".to_string());
        }

        Ok(())
    }
}

impl EndpointContainer for RouterContainer {
    fn add_endpoint(&mut self, endpoint: Endpoint) -> Result<(), DeploymentError> {
        if let Err(reason) = self.validate(&endpoint.path) {
            warn!("Rejecting endpoint {}: {reason}", endpoint.path);
            return Err(DeploymentError::new(endpoint.path, reason));
        }

        debug!("Accepted endpoint {}", endpoint.path);
        self.endpoints.push(endpoint);
        Ok(())
    }
}

use std::error::Error as StdError;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;
use notification::error::DeploymentError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The notifier's endpoint could not be installed.
    Deployment(DeploymentError),
    /// Binding or serving the listener failed.
    Io(std::io::Error),
    /// A job body named a different job than the request path.
    JobNameMismatch { path: String, body: String },
    /// An upload path segment that cannot name a job file.
    InvalidFileName(String),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Deployment(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Deployment(err) => write!(f, "{err}"),
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::JobNameMismatch { path, body } => {
                write!(f, "job name {body} in body does not match {path} in path")
            }
            Error::InvalidFileName(name) => write!(f, "invalid job file name: {name:?}"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::JobNameMismatch { .. } | Error::InvalidFileName(_) => {
                debug!("Rejecting request: {self}");
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()).into_response()
            }
            Error::Deployment(_) | Error::Io(_) => {
                error!("Internal error: {self}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}

impl From<DeploymentError> for Error {
    fn from(err: DeploymentError) -> Self {
        Error::Deployment(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

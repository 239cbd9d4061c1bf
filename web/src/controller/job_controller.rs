use crate::controller::ApiResponse;
use crate::{AppState, Error};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use events::{JobEvent, PrintJob, Printer};
use log::*;
use serde::Deserialize;
use std::path::PathBuf;

/// Printer the job is running on, when the caller knows it.
#[derive(Debug, Default, Deserialize)]
pub struct JobChangedParams {
    pub printer: Option<String>,
}

/// PUT a job's latest status snapshot and relay it to the job's subscribers.
pub async fn update(
    State(app_state): State<AppState>,
    Path(job_name): Path<String>,
    Query(params): Query<JobChangedParams>,
    Json(job): Json<PrintJob>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT job status for {job_name}: {job:?}");

    if job.file_name != job_name {
        return Err(Error::JobNameMismatch {
            path: job_name,
            body: job.file_name,
        });
    }

    let printer_name = params
        .printer
        .or_else(|| job.printer_name.clone())
        .unwrap_or_default();

    app_state
        .event_publisher
        .publish(JobEvent::JobChanged {
            printer: Printer::new(printer_name),
            job: job.clone(),
        })
        .await;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(StatusCode::ACCEPTED.into(), job)),
    ))
}

/// POST notice that a job file finished uploading; subscribers get a Ready event.
pub async fn upload_complete(
    State(app_state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST upload complete for {file_name}");

    if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name == ".." {
        return Err(Error::InvalidFileName(file_name));
    }

    app_state
        .event_publisher
        .publish(JobEvent::FileUploadComplete {
            file: PathBuf::from(&file_name),
        })
        .await;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(StatusCode::ACCEPTED.into(), file_name)),
    ))
}

//! Sandbox endpoints over the in-memory engine.
//!
//! These stand in for the orchestration engine's own tooling: they create
//! jobs the worker runtime will pick up on its next poll and expose what
//! the handlers did with them.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{JobKey, ProcessInstanceKey, Variables};
use engine_client::job::DEFAULT_RETRIES;
use engine_client::{JobState, PublishedMessage};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub job_type: String,
    pub process_instance_key: Option<i64>,
    pub retries: Option<u32>,
    #[serde(default)]
    pub variables: Variables,
}

// -- Response types --

#[derive(Serialize)]
pub struct JobCreatedResponse {
    pub job_key: JobKey,
    pub process_instance_key: ProcessInstanceKey,
}

#[derive(Serialize)]
pub struct JobStateResponse {
    pub job_key: JobKey,
    #[serde(flatten)]
    pub state: JobState,
}

#[derive(Serialize)]
pub struct CancelledResponse {
    pub process_instance_key: ProcessInstanceKey,
    pub jobs_removed: usize,
}

// -- Handlers --

/// POST /jobs: create an activatable job for a registered job type.
#[tracing::instrument(skip(state, req), fields(job_type = %req.job_type))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobCreatedResponse>), ApiError> {
    if !state.runtime.registry().contains(&req.job_type) {
        return Err(ApiError::BadRequest(format!(
            "No handler registered for job type '{}'",
            req.job_type
        )));
    }

    let process_instance_key = ProcessInstanceKey::new(
        req.process_instance_key
            .unwrap_or_else(|| state.next_process_instance.fetch_add(1, Ordering::Relaxed)),
    );
    let job_key = state
        .engine
        .create_job(
            req.job_type,
            process_instance_key,
            req.retries.unwrap_or(DEFAULT_RETRIES),
            req.variables,
        )
        .await;

    metrics::counter!("sandbox_jobs_created_total").increment(1);
    tracing::info!(%job_key, %process_instance_key, "job created");
    Ok((
        StatusCode::CREATED,
        Json(JobCreatedResponse {
            job_key,
            process_instance_key,
        }),
    ))
}

/// GET /jobs/{key}: current state of a job.
#[tracing::instrument(skip(state))]
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(key): Path<i64>,
) -> Result<Json<JobStateResponse>, ApiError> {
    let job_key = JobKey::new(key);
    let job_state = state
        .engine
        .job_state(job_key)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Job {key} not found")))?;
    Ok(Json(JobStateResponse {
        job_key,
        state: job_state,
    }))
}

/// DELETE /process-instances/{key}: cancel a process instance's jobs.
#[tracing::instrument(skip(state))]
pub async fn cancel_process_instance(
    State(state): State<Arc<AppState>>,
    Path(key): Path<i64>,
) -> Result<Json<CancelledResponse>, ApiError> {
    let process_instance_key = ProcessInstanceKey::new(key);
    let jobs_removed = state
        .engine
        .cancel_process_instance(process_instance_key)
        .await;
    if jobs_removed == 0 {
        return Err(ApiError::NotFound(format!(
            "Process instance {key} has no jobs"
        )));
    }
    Ok(Json(CancelledResponse {
        process_instance_key,
        jobs_removed,
    }))
}

/// GET /messages: messages published by the handlers, oldest first.
pub async fn messages(State(state): State<Arc<AppState>>) -> Json<Vec<PublishedMessage>> {
    Json(state.engine.published_messages().await)
}

use crate::application::services::{CreateJobRequest, DispatchSummary};
use crate::domain::entities::{otp_submission_ready, Job, JobEvent, PhotoVerdict};
use crate::domain::errors::DispatchError;
use crate::infrastructure::http::middleware::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

/// POST /api/jobs - Request service at a location
pub async fn create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    if request.customer_id.trim().is_empty() {
        return Err(ApiError::BadRequest("customer_id is required".to_string()));
    }

    let job = state.dispatch_service.create_job(request).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/jobs/active - The job currently occupying the slot
pub async fn get_active_job(State(state): State<AppState>) -> ApiResult<Json<Job>> {
    state
        .dispatch_service
        .active_job()
        .await
        .map(Json)
        .ok_or_else(|| DispatchError::NoActiveJob.into())
}

/// POST /api/jobs/:id/events - Drive the job lifecycle
pub async fn post_job_event(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(event): Json<JobEvent>,
) -> ApiResult<Json<Job>> {
    let job = state.dispatch_service.update_status(&job_id, event).await?;
    Ok(Json(job))
}

/// POST /api/jobs/active/cancel - Customer cancels while searching
pub async fn cancel_active_job(State(state): State<AppState>) -> ApiResult<Json<Job>> {
    let job = state.dispatch_service.cancel_job().await?;
    Ok(Json(job))
}

/// GET /api/jobs/history - Completed jobs, newest first
pub async fn list_history(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.dispatch_service.history().await)
}

/// GET /api/summary
pub async fn get_summary(State(state): State<AppState>) -> Json<DispatchSummary> {
    Json(state.dispatch_service.summary().await)
}

#[derive(Debug, Deserialize)]
pub struct OtpReadinessRequest {
    pub verdict: Option<PhotoVerdict>,
    pub otp_input: String,
}

#[derive(Debug, Serialize)]
pub struct OtpReadinessResponse {
    pub ready: bool,
}

/// POST /api/jobs/otp-readiness - Whether the OTP submit action should be enabled
pub async fn otp_readiness(Json(request): Json<OtpReadinessRequest>) -> Json<OtpReadinessResponse> {
    Json(OtpReadinessResponse {
        ready: otp_submission_ready(request.verdict.as_ref(), &request.otp_input),
    })
}

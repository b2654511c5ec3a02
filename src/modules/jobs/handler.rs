use super::dto::SubmitJobRequest;
use super::service::IntakeService;
use crate::common::error::ApiError;
use crate::common::response::{ApiSuccess, ErrorResponse, MessageResponse};
use crate::state::AppState;
use axum::{body::Bytes, extract::State, http::StatusCode};

pub const PROCESSING_STARTED: &str = "Video processing started";

/// Submit a video-processing job
#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body = SubmitJobRequest,
    responses(
        (status = 200, description = "Job recorded and queued", body = MessageResponse),
        (status = 400, description = "Malformed payload or missing parameters", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Configuration or dependency failure", body = ErrorResponse)
    ),
    tag = "Jobs"
)]
pub async fn submit_job(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<ApiSuccess<MessageResponse>, ApiError> {
    let job = SubmitJobRequest::parse(&body)?.into_submission()?;

    IntakeService::submit(&state, job).await?;

    Ok(ApiSuccess(
        MessageResponse::new(PROCESSING_STARTED),
        StatusCode::OK,
    ))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

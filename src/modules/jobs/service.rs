use super::events::JobMessage;
use super::model::JobSubmission;
use super::reconcile::{WriteIntent, plan_write};
use crate::common::error::ApiError;
use crate::state::AppState;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

pub struct IntakeService;

impl IntakeService {
    /// Reconcile the job record, then enqueue the job.
    ///
    /// The record write and the enqueue are not transactional: when the
    /// enqueue fails the record stays at `processing` with nothing queued.
    #[instrument(name = "submit_job", skip_all, fields(job_id = %job.job_id))]
    pub async fn submit(state: &AppState, job: JobSubmission) -> Result<(), ApiError> {
        let credentials = state
            .config
            .store_credentials()
            .map_err(|e| ApiError::configuration(e.to_string()))?;

        let store = state
            .stores
            .connect(&credentials)
            .await
            .map_err(|e| ApiError::configuration(format!("{:#}", e)))?;

        let current = store.get(&job.job_id).await.map_err(ApiError::store)?;

        match plan_write(current.as_ref(), &job, OffsetDateTime::now_utc()) {
            WriteIntent::Create(record) => {
                store
                    .create(&job.job_id, &record)
                    .await
                    .map_err(ApiError::store)?;
                info!("Job record created");
            }
            WriteIntent::ResetStatus(status) => {
                store
                    .update_status(&job.job_id, &status)
                    .await
                    .map_err(ApiError::store)?;
                let previous = current.as_ref().map(|r| r.status.as_str()).unwrap_or_default();
                info!(previous, "Job record status reset to {}", status);
            }
        }

        let message = JobMessage::from(&job);
        if let Err(e) = state.queue.send(&message).await {
            warn!("Job record left at processing with no queued message");
            return Err(ApiError::queue(e));
        }

        info!("🎬 Job dispatched");
        Ok(())
    }
}

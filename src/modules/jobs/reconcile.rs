use super::model::{JobRecord, JobStatus, JobSubmission};
use time::OffsetDateTime;

/// The single store write a submission turns into.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteIntent {
    /// No record yet: write the full record.
    Create(JobRecord),
    /// Record exists: overwrite `status` only.
    ResetStatus(JobStatus),
}

/// Decide how a submission lands on the store.
///
/// An existing record keeps its `createdAt`, `fileName` and `videoUrl` even
/// when the submission carries different values. Its status is forced back
/// to `processing` whatever it currently is, so a resubmission reopens jobs
/// that consumers already marked finished or failed.
pub fn plan_write(
    current: Option<&JobRecord>,
    job: &JobSubmission,
    now: OffsetDateTime,
) -> WriteIntent {
    match current {
        None => WriteIntent::Create(JobRecord {
            file_name: job.file_name.clone(),
            video_url: job.video_url.clone(),
            status: JobStatus::Processing,
            created_at: Some(now),
        }),
        Some(_) => WriteIntent::ResetStatus(JobStatus::Processing),
    }
}

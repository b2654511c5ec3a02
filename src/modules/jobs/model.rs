use std::fmt;
use time::OffsetDateTime;

/// Job status as stored on the record. Only `Processing` is ever written
/// here; downstream consumers may write anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Processing,
    Other(String),
}

impl JobStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "processing" => JobStatus::Processing,
            other => JobStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistent record in the `videos` collection, keyed by job id.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub file_name: String,
    pub video_url: String,
    pub status: JobStatus,
    /// Set once on creation. May be absent on records written elsewhere.
    pub created_at: Option<OffsetDateTime>,
}

/// A submission that passed validation: all three fields present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSubmission {
    pub job_id: String,
    pub video_url: String,
    pub file_name: String,
}

use super::model::JobSubmission;
use crate::common::error::ApiError;
use crate::infrastructure::firestore::document_id_violation;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Wire name and struct field for each required parameter, in reporting order.
const REQUIRED: [(&str, &str); 3] = [
    ("video_url", "videoUrl"),
    ("file_name", "fileName"),
    ("job_id", "firestoreDocId"),
];

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitJobRequest {
    /// Source location of the video to process.
    #[validate(required, length(min = 1))]
    pub video_url: Option<String>,
    /// Target output file name.
    #[validate(required, length(min = 1))]
    pub file_name: Option<String>,
    /// Caller-assigned job identifier, also the record key.
    #[serde(rename = "firestoreDocId", alias = "jobId")]
    #[validate(required, length(min = 1))]
    pub job_id: Option<String>,
}

impl SubmitJobRequest {
    /// Decodes a JSON object body. Arrays are refused even though serde would
    /// read them positionally.
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| ApiError::MalformedPayload(e.to_string()))?;
        if !value.is_object() {
            return Err(ApiError::MalformedPayload(
                "expected a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| ApiError::MalformedPayload(e.to_string()))
    }

    pub fn into_submission(self) -> Result<JobSubmission, ApiError> {
        if let Err(errors) = self.validate() {
            let failing = errors.field_errors();
            let missing = REQUIRED
                .iter()
                .filter(|(field, wire)| failing.contains_key(*field) || failing.contains_key(*wire))
                .map(|(_, wire)| *wire)
                .collect();
            return Err(ApiError::MissingParameters(missing));
        }

        match (self.video_url, self.file_name, self.job_id) {
            (Some(video_url), Some(file_name), Some(job_id)) => {
                if let Some(reason) = document_id_violation(&job_id) {
                    return Err(ApiError::InvalidParameter {
                        field: "firestoreDocId",
                        reason,
                    });
                }
                Ok(JobSubmission {
                    job_id,
                    video_url,
                    file_name,
                })
            }
            _ => Err(ApiError::MissingParameters(
                REQUIRED.iter().map(|(_, wire)| *wire).collect(),
            )),
        }
    }
}

use super::model::JobSubmission;
use crate::infrastructure::queue::rabbitmq::RabbitMqService;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Message handed to the processing queue, one per accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMessage {
    pub video_url: String,
    pub file_name: String,
    #[serde(rename = "firestoreDocId")]
    pub job_id: String,
}

impl From<&JobSubmission> for JobMessage {
    fn from(job: &JobSubmission) -> Self {
        Self {
            video_url: job.video_url.clone(),
            file_name: job.file_name.clone(),
            job_id: job.job_id.clone(),
        }
    }
}

/// Fire-and-forget send. `Ok` means the queue accepted the message, not
/// that anyone processed it.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn send(&self, message: &JobMessage) -> Result<()>;
}

#[async_trait]
impl JobQueue for RabbitMqService {
    async fn send(&self, message: &JobMessage) -> Result<()> {
        let payload = serde_json::to_vec(message)?;
        let message_id = Uuid::new_v4().to_string();

        self.publish(&payload, &message_id).await?;

        debug!(%message_id, queue = self.queue(), "Job message published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn serializes_with_downstream_field_names() {
        let message = JobMessage {
            video_url: "https://x/a.mp4".to_string(),
            file_name: "a.mp4".to_string(),
            job_id: "doc1".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "videoUrl": "https://x/a.mp4",
                "fileName": "a.mp4",
                "firestoreDocId": "doc1"
            })
        );
    }

    #[tokio::test]
    async fn unreachable_broker_fails_each_send() {
        let queue = RabbitMqService::new("amqp://127.0.0.1:1/%2f", "q");
        let message = JobMessage {
            video_url: "https://x/a.mp4".to_string(),
            file_name: "a.mp4".to_string(),
            job_id: "doc1".to_string(),
        };

        for _ in 0..2 {
            let result = timeout(Duration::from_secs(10), JobQueue::send(&queue, &message))
                .await
                .expect("send should fail fast against a closed port");
            assert!(result.is_err());
        }
    }
}

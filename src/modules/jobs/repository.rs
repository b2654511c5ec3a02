use super::model::{JobRecord, JobStatus};
use crate::config::credentials::ServiceAccountKey;
use crate::config::settings::AppConfig;
use crate::infrastructure::firestore::auth::{AccessTokenSource, ServiceAccountTokens, StaticToken};
use crate::infrastructure::firestore::{Document, FirestoreClient, FirestoreError, Value};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::OnceCell;

const FIELD_FILE_NAME: &str = "fileName";
const FIELD_VIDEO_URL: &str = "videoUrl";
const FIELD_STATUS: &str = "status";
const FIELD_CREATED_AT: &str = "createdAt";

/// Keyed access to job records. Each call is one remote round trip and is
/// atomic on its own; nothing spans two calls.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get(&self, job_id: &str) -> Result<Option<JobRecord>>;
    async fn create(&self, job_id: &str, record: &JobRecord) -> Result<()>;
    async fn update_status(&self, job_id: &str, status: &JobStatus) -> Result<()>;
}

/// Builds a store for the credential resolved on the current request.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self, credentials: &ServiceAccountKey) -> Result<Arc<dyn JobStore>>;
}

pub struct FirestoreJobRepository {
    client: FirestoreClient,
    collection: String,
}

impl FirestoreJobRepository {
    pub fn new(client: FirestoreClient, collection: &str) -> Self {
        Self {
            client,
            collection: collection.to_string(),
        }
    }

    fn to_fields(record: &JobRecord) -> Result<HashMap<String, Value>> {
        let mut fields = HashMap::from([
            (
                FIELD_FILE_NAME.to_string(),
                Value::StringValue(record.file_name.clone()),
            ),
            (
                FIELD_VIDEO_URL.to_string(),
                Value::StringValue(record.video_url.clone()),
            ),
            (
                FIELD_STATUS.to_string(),
                Value::StringValue(record.status.as_str().to_string()),
            ),
        ]);

        if let Some(created_at) = record.created_at {
            let stamp = created_at
                .format(&Rfc3339)
                .map_err(|e| anyhow!("Failed to format createdAt: {}", e))?;
            fields.insert(FIELD_CREATED_AT.to_string(), Value::TimestampValue(stamp));
        }

        Ok(fields)
    }

    fn from_document(doc: &Document) -> JobRecord {
        let text = |name: &str| {
            doc.field(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        JobRecord {
            file_name: text(FIELD_FILE_NAME),
            video_url: text(FIELD_VIDEO_URL),
            status: JobStatus::parse(&text(FIELD_STATUS)),
            created_at: doc
                .field(FIELD_CREATED_AT)
                .and_then(Value::as_timestamp)
                .and_then(|s| OffsetDateTime::parse(s, &Rfc3339).ok()),
        }
    }
}

#[async_trait]
impl JobStore for FirestoreJobRepository {
    async fn get(&self, job_id: &str) -> Result<Option<JobRecord>> {
        let doc = self
            .client
            .get_document(&self.collection, job_id)
            .await
            .map_err(|e| anyhow!("Failed to fetch job record: {}", e))?;

        Ok(doc.as_ref().map(Self::from_document))
    }

    async fn create(&self, job_id: &str, record: &JobRecord) -> Result<()> {
        let fields = Self::to_fields(record)?;
        self.client
            .set_document(&self.collection, job_id, fields)
            .await
            .map_err(|e| anyhow!("Failed to create job record: {}", e))?;
        Ok(())
    }

    async fn update_status(&self, job_id: &str, status: &JobStatus) -> Result<()> {
        let fields = HashMap::from([(
            FIELD_STATUS.to_string(),
            Value::StringValue(status.as_str().to_string()),
        )]);
        self.client
            .update_fields(&self.collection, job_id, fields)
            .await
            .map_err(|e| anyhow!("Failed to update job status: {}", e))?;
        Ok(())
    }
}

/// Creates the Firestore-backed store on first use and hands out the same
/// instance afterwards, so the service-account token cache is shared.
pub struct FirestoreConnector {
    http: Client,
    database: String,
    collection: String,
    emulator_host: Option<String>,
    store: OnceCell<Arc<FirestoreJobRepository>>,
}

impl FirestoreConnector {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = FirestoreClient::http_client(config.firestore_timeout)?;

        Ok(Self {
            http,
            database: config.firestore_database.clone(),
            collection: config.firestore_collection.clone(),
            emulator_host: config.firestore_emulator_host.clone(),
            store: OnceCell::new(),
        })
    }

    fn build(&self, credentials: &ServiceAccountKey) -> Result<FirestoreJobRepository, FirestoreError> {
        let tokens: Arc<dyn AccessTokenSource> = match self.emulator_host {
            Some(_) => Arc::new(StaticToken("owner".to_string())),
            None => Arc::new(ServiceAccountTokens::from_key(credentials)?),
        };

        let base_url = FirestoreClient::documents_url(
            &credentials.project_id,
            &self.database,
            self.emulator_host.as_deref(),
        );

        Ok(FirestoreJobRepository::new(
            FirestoreClient::new(self.http.clone(), base_url, tokens),
            &self.collection,
        ))
    }
}

#[async_trait]
impl StoreConnector for FirestoreConnector {
    async fn connect(&self, credentials: &ServiceAccountKey) -> Result<Arc<dyn JobStore>> {
        let store = self
            .store
            .get_or_try_init(|| async { self.build(credentials).map(Arc::new) })
            .await?;

        Ok(store.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CREDENTIALS, test_config};
    use serde_json::json;
    use std::time::Duration;
    use time::macros::datetime;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const DOCS: &str = "/v1/projects/demo/databases/(default)/documents";

    fn repository_for(server: &MockServer) -> FirestoreJobRepository {
        let client = FirestoreClient::new(
            FirestoreClient::http_client(Duration::from_secs(5)).unwrap(),
            format!("{}{}", server.uri(), DOCS),
            Arc::new(StaticToken("owner".to_string())),
        );
        FirestoreJobRepository::new(client, "videos")
    }

    #[tokio::test]
    async fn reads_existing_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/videos/doc1", DOCS)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fields": {
                    "fileName": { "stringValue": "a.mp4" },
                    "videoUrl": { "stringValue": "https://x/a.mp4" },
                    "status": { "stringValue": "done" },
                    "createdAt": { "timestampValue": "2024-05-01T10:00:00Z" }
                }
            })))
            .mount(&server)
            .await;

        let record = repository_for(&server).get("doc1").await.unwrap().unwrap();

        assert_eq!(
            record,
            JobRecord {
                file_name: "a.mp4".to_string(),
                video_url: "https://x/a.mp4".to_string(),
                status: JobStatus::Other("done".to_string()),
                created_at: Some(datetime!(2024-05-01 10:00 UTC)),
            }
        );
    }

    #[tokio::test]
    async fn creates_full_record() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/videos/doc1", DOCS)))
            .and(body_json(json!({
                "fields": {
                    "fileName": { "stringValue": "a.mp4" },
                    "videoUrl": { "stringValue": "https://x/a.mp4" },
                    "status": { "stringValue": "processing" },
                    "createdAt": { "timestampValue": "2024-05-01T10:00:00Z" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "fields": {} })))
            .expect(1)
            .mount(&server)
            .await;

        let record = JobRecord {
            file_name: "a.mp4".to_string(),
            video_url: "https://x/a.mp4".to_string(),
            status: JobStatus::Processing,
            created_at: Some(datetime!(2024-05-01 10:00 UTC)),
        };
        repository_for(&server).create("doc1", &record).await.unwrap();
    }

    #[tokio::test]
    async fn updates_status_field_only() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{}/videos/doc1", DOCS)))
            .and(query_param("updateMask.fieldPaths", "status"))
            .and(body_json(json!({
                "fields": { "status": { "stringValue": "processing" } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "fields": {} })))
            .expect(1)
            .mount(&server)
            .await;

        repository_for(&server)
            .update_status("doc1", &JobStatus::Processing)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn surfaces_store_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = repository_for(&server).get("doc1").await.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch job record"));
    }

    #[tokio::test]
    async fn unusable_private_key_fails_every_connect() {
        let connector = FirestoreConnector::new(&test_config()).unwrap();
        let credentials = ServiceAccountKey::parse(CREDENTIALS).unwrap();

        let first = connector.connect(&credentials).await;
        assert!(first.is_err());
        assert!(connector.store.get().is_none());

        let second = connector.connect(&credentials).await;
        assert!(second.is_err());
        assert!(connector.store.get().is_none());
    }

    #[tokio::test]
    async fn emulator_connector_reuses_the_first_store() {
        let connector = FirestoreConnector::new(&AppConfig {
            firestore_emulator_host: Some("localhost:8080".to_string()),
            ..test_config()
        })
        .unwrap();
        let credentials = ServiceAccountKey::parse(CREDENTIALS).unwrap();

        let first = connector.connect(&credentials).await.unwrap();
        let second = connector.connect(&credentials).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }
}

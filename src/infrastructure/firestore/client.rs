//! Firestore REST API client.
//!
//! Thin wrapper over the v1 `documents` resource. Every call is a live round
//! trip: no caching and no retries, callers decide what a failure means.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, StatusCode, Url};
use tracing::{Instrument, debug, info_span};

use crate::infrastructure::firestore::auth::AccessTokenSource;
use crate::infrastructure::firestore::error::{FirestoreError, FirestoreResult};
use crate::infrastructure::firestore::types::{Document, Value, document_id_violation};

const PRODUCTION_HOST: &str = "https://firestore.googleapis.com";

#[derive(Clone)]
pub struct FirestoreClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl FirestoreClient {
    pub fn new(http: Client, base_url: String, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// Shared HTTP client, pooled across every store built from it.
    pub fn http_client(timeout: Duration) -> FirestoreResult<Client> {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("video-intake/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FirestoreError::Network)
    }

    /// `documents` root for a project, against production or an emulator host.
    pub fn documents_url(project_id: &str, database_id: &str, emulator_host: Option<&str>) -> String {
        let host = match emulator_host {
            Some(host) => format!("http://{}", host.trim_end_matches('/')),
            None => PRODUCTION_HOST.to_string(),
        };
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            host, project_id, database_id
        )
    }

    fn document_url(&self, collection: &str, doc_id: &str) -> FirestoreResult<Url> {
        // `push` drops "." and "..", which would address the collection instead.
        if let Some(reason) = document_id_violation(doc_id) {
            return Err(FirestoreError::RequestFailed(format!(
                "Invalid document id {:?}: {}",
                doc_id, reason
            )));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FirestoreError::RequestFailed(format!("Invalid base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| FirestoreError::RequestFailed("Base url cannot hold a path".to_string()))?
            .pop_if_empty()
            .push(collection)
            .push(doc_id);
        Ok(url)
    }

    /// Fetch a document; `None` when it does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> FirestoreResult<Option<Document>> {
        let url = self.document_url(collection, doc_id)?;

        self.execute_request("get_document", collection, doc_id, async {
            let token = self.tokens.access_token().await?;
            let response = self.http.get(url.clone()).bearer_auth(&token).send().await?;

            match response.status() {
                StatusCode::OK => Ok(Some(response.json::<Document>().await?)),
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    /// Write a whole document, replacing any existing one.
    pub async fn set_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
    ) -> FirestoreResult<Document> {
        let url = self.document_url(collection, doc_id)?;
        self.patch("set_document", collection, doc_id, url, Document::new(fields))
            .await
    }

    /// Overwrite only the named fields of an existing document.
    pub async fn update_fields(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
    ) -> FirestoreResult<Document> {
        let mut url = self.document_url(collection, doc_id)?;
        {
            let mut query = url.query_pairs_mut();
            let mut mask: Vec<&String> = fields.keys().collect();
            mask.sort();
            for path in mask {
                query.append_pair("updateMask.fieldPaths", path);
            }
            query.append_pair("currentDocument.exists", "true");
        }

        self.patch("update_fields", collection, doc_id, url, Document::new(fields))
            .await
    }

    async fn patch(
        &self,
        operation: &str,
        collection: &str,
        doc_id: &str,
        url: Url,
        body: Document,
    ) -> FirestoreResult<Document> {
        self.execute_request(operation, collection, doc_id, async {
            let token = self.tokens.access_token().await?;
            let response = self
                .http
                .patch(url.clone())
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await?;

            match response.status() {
                StatusCode::OK => Ok(response.json::<Document>().await?),
                status => Err(Self::handle_error_response(status, &url, response).await),
            }
        })
        .await
    }

    async fn execute_request<T, F>(
        &self,
        operation: &str,
        collection: &str,
        doc_id: &str,
        fut: F,
    ) -> FirestoreResult<T>
    where
        F: std::future::Future<Output = FirestoreResult<T>>,
    {
        let span = info_span!(
            "firestore_request",
            operation = %operation,
            collection = %collection,
            doc_id = %doc_id
        );

        let start = Instant::now();
        let result = fut.instrument(span).await;
        debug!(
            operation,
            ok = result.is_ok(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Firestore request finished"
        );

        result
    }

    async fn handle_error_response(
        status: StatusCode,
        url: &Url,
        response: reqwest::Response,
    ) -> FirestoreError {
        let body = response.text().await.unwrap_or_default();
        FirestoreError::from_http_status(status.as_u16(), format!("{} failed: {}", url, body))
    }
}

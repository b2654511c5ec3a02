use crate::config::credentials::ServiceAccountKey;
use crate::infrastructure::firestore::error::{FirestoreError, FirestoreResult};
use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};

/// OAuth scope for Firestore/Datastore access.
pub const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self) -> FirestoreResult<String>;
}

/// Tokens minted from a service-account key. `gcp_auth` caches them until
/// shortly before expiry.
pub struct ServiceAccountTokens {
    account: CustomServiceAccount,
}

impl ServiceAccountTokens {
    pub fn from_key(key: &ServiceAccountKey) -> FirestoreResult<Self> {
        let account = CustomServiceAccount::from_json(key.as_json()).map_err(|e| {
            FirestoreError::auth_error(format!("Failed to load service account: {}", e))
        })?;
        Ok(Self { account })
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokens {
    async fn access_token(&self) -> FirestoreResult<String> {
        let token = self
            .account
            .token(&[FIRESTORE_SCOPE])
            .await
            .map_err(|e| FirestoreError::auth_error(format!("Failed to mint token: {}", e)))?;
        Ok(token.as_str().to_string())
    }
}

/// Fixed bearer token. The emulator accepts `owner` as an admin token.
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> FirestoreResult<String> {
        Ok(self.0.clone())
    }
}

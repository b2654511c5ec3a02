use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("{0} environment variable is missing")]
    Missing(&'static str),

    #[error("Invalid Firestore credentials: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid Firestore credentials: `{0}` is empty")]
    Incomplete(&'static str),
}

/// Google service-account key, as downloaded from the cloud console.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    private_key: String,
    #[serde(skip)]
    raw: String,
}

impl ServiceAccountKey {
    pub fn parse(raw: &str) -> Result<Self, CredentialsError> {
        let mut key: ServiceAccountKey = serde_json::from_str(raw)?;

        for (name, value) in [
            ("project_id", &key.project_id),
            ("client_email", &key.client_email),
            ("private_key", &key.private_key),
        ] {
            if value.trim().is_empty() {
                return Err(CredentialsError::Incomplete(name));
            }
        }

        key.raw = raw.to_string();
        Ok(key)
    }

    /// The original JSON blob, for handing to the token provider.
    pub fn as_json(&self) -> &str {
        &self.raw
    }
}

// Keep the private key out of logs.
impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

use crate::config::credentials::{CredentialsError, ServiceAccountKey};
use crate::config::env::{self, EnvKey};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub max_body_bytes: usize,
    /// Raw credential blob, resolved on every request.
    pub firestore_credentials: Option<String>,
    pub firestore_database: String,
    pub firestore_collection: String,
    pub firestore_emulator_host: Option<String>,
    pub firestore_timeout: Duration,
    pub rabbitmq_url: String,
    pub video_queue: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            max_body_bytes: env::get_parsed(EnvKey::MaxBodyBytes, 64 * 1024),
            firestore_credentials: env::get_opt(EnvKey::FirestoreCredentials),
            firestore_database: env::get_or(EnvKey::FirestoreDatabase, "(default)"),
            firestore_collection: env::get_or(EnvKey::FirestoreCollection, "videos"),
            firestore_emulator_host: env::get_opt(EnvKey::FirestoreEmulatorHost),
            firestore_timeout: Duration::from_secs(env::get_parsed(
                EnvKey::FirestoreTimeoutSecs,
                30,
            )),
            rabbitmq_url: env::get(EnvKey::RabbitMqUrl)?,
            video_queue: env::get_or(EnvKey::VideoQueue, "video_processing"),
        })
    }

    pub fn store_credentials(&self) -> Result<ServiceAccountKey, CredentialsError> {
        match self.firestore_credentials.as_deref() {
            Some(raw) => ServiceAccountKey::parse(raw),
            None => Err(CredentialsError::Missing(EnvKey::FirestoreCredentials.as_str())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_config;

    #[test]
    fn resolves_configured_credentials() {
        let key = test_config().store_credentials().unwrap();
        assert_eq!(key.project_id, "video-jobs");
    }

    #[test]
    fn reports_missing_credentials_by_variable_name() {
        let config = AppConfig {
            firestore_credentials: None,
            ..test_config()
        };

        let err = config.store_credentials().unwrap_err();
        assert_eq!(
            err.to_string(),
            "FIRESTORE_PRIVATE_KEY_JSON environment variable is missing"
        );
    }
}

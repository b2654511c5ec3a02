use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    MaxBodyBytes,
    FirestoreCredentials,
    FirestoreDatabase,
    FirestoreCollection,
    FirestoreEmulatorHost,
    FirestoreTimeoutSecs,
    RabbitMqUrl,
    VideoQueue,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::MaxBodyBytes => "MAX_BODY_BYTES",
            EnvKey::FirestoreCredentials => "FIRESTORE_PRIVATE_KEY_JSON",
            EnvKey::FirestoreDatabase => "FIRESTORE_DATABASE_ID",
            EnvKey::FirestoreCollection => "FIRESTORE_COLLECTION",
            EnvKey::FirestoreEmulatorHost => "FIRESTORE_EMULATOR_HOST",
            EnvKey::FirestoreTimeoutSecs => "FIRESTORE_TIMEOUT_SECS",
            EnvKey::RabbitMqUrl => "RABBITMQ_URL",
            EnvKey::VideoQueue => "VIDEO_QUEUE",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

/// Unset and empty variables both read as `None`.
pub fn get_opt(key: EnvKey) -> Option<String> {
    env::var(key.as_str()).ok().filter(|v| !v.trim().is_empty())
}

pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    match get(key) {
        Ok(val) => val.parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}

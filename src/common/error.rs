use crate::common::response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

pub const MISSING_PARAMETERS: &str =
    "Missing required parameters: videoUrl, fileName, firestoreDocId";

/// External systems a request can fail against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    DocumentStore,
    Queue,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::DocumentStore => f.write_str("document store"),
            Dependency::Queue => f.write_str("job queue"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    #[error("Invalid {field}: {reason}")]
    InvalidParameter {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{dependency} call failed: {error:#}")]
    Dependency {
        dependency: Dependency,
        error: anyhow::Error,
    },
}

impl ApiError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn store(error: anyhow::Error) -> Self {
        Self::Dependency {
            dependency: Dependency::DocumentStore,
            error,
        }
    }

    pub fn queue(error: anyhow::Error) -> Self {
        Self::Dependency {
            dependency: Dependency::Queue,
            error,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MalformedPayload(_)
            | ApiError::MissingParameters(_)
            | ApiError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            ApiError::Configuration(_) | ApiError::Dependency { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MethodNotAllowed => "method_not_allowed",
            ApiError::MalformedPayload(_)
            | ApiError::MissingParameters(_)
            | ApiError::InvalidParameter { .. } => "bad_request",
            ApiError::Configuration(_) => "configuration_error",
            ApiError::Dependency { .. } => "dependency_error",
        }
    }

    fn body(&self) -> ErrorResponse {
        let code = self.code();
        match self {
            ApiError::MethodNotAllowed => ErrorResponse::new("Method not allowed", code),
            ApiError::MalformedPayload(_) => ErrorResponse::new("Malformed payload", code),
            ApiError::MissingParameters(fields) => ErrorResponse {
                missing: fields.iter().map(|f| f.to_string()).collect(),
                ..ErrorResponse::new(MISSING_PARAMETERS, code)
            },
            ApiError::InvalidParameter { field, reason } => ErrorResponse {
                message: Some(format!("{} {}", field, reason)),
                ..ErrorResponse::new("Invalid parameter", code)
            },
            // Internal detail stays in the log, only the kind reaches the caller.
            ApiError::Configuration(_) => ErrorResponse {
                message: Some("Service configuration is invalid".to_string()),
                ..ErrorResponse::new("Internal server error", code)
            },
            ApiError::Dependency { dependency, .. } => ErrorResponse {
                message: Some(format!("Request to {} failed", dependency)),
                ..ErrorResponse::new("Internal server error", code)
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(code = self.code(), "❌ {}", self);
        } else {
            warn!(code = self.code(), "Rejected request: {}", self);
        }

        (status, Json(self.body())).into_response()
    }
}

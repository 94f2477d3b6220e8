use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Request-level errors surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let code = self.status_code();
        let message = match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Internal(_) => self.to_string(),
        };

        HttpResponse::build(code).json(ErrorResponse {
            error: message,
            code: code.as_u16(),
        })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<prometheus::Error> for AppError {
    fn from(err: prometheus::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Startup errors while reading the offline tables. Always fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read table {path}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Table {path} is empty")]
    Empty { path: PathBuf },
}

/// Failure talking to an online-path collaborator.
///
/// Never reaches the caller: the online leg converts it to an empty list.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{service} request failed: {message}")]
    Request {
        service: &'static str,
        message: String,
    },

    #[error("{service} timed out after {after:?}")]
    Timeout {
        service: &'static str,
        after: std::time::Duration,
    },

    #[error("{service} returned a malformed payload: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },
}

impl CollaboratorError {
    pub fn from_timeout(
        service: &'static str,
        err: resilience::TimeoutError<CollaboratorError>,
    ) -> Self {
        match err {
            resilience::TimeoutError::Elapsed(after) => {
                CollaboratorError::Timeout { service, after }
            }
            resilience::TimeoutError::OperationFailed(inner) => inner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_validation_is_client_error() {
        let err = AppError::Validation("user_id must be an integer".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_timeout_maps_to_collaborator_timeout() {
        let err = CollaboratorError::from_timeout(
            "similarity",
            resilience::TimeoutError::Elapsed(Duration::from_secs(2)),
        );
        assert!(matches!(
            err,
            CollaboratorError::Timeout {
                service: "similarity",
                ..
            }
        ));
    }

    #[test]
    fn test_operation_failure_is_unwrapped() {
        let inner = CollaboratorError::Request {
            service: "events",
            message: "connection refused".to_string(),
        };
        let err = CollaboratorError::from_timeout(
            "events",
            resilience::TimeoutError::OperationFailed(inner),
        );
        assert_eq!(err.to_string(), "events request failed: connection refused");
    }
}

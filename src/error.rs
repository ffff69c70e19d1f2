use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::service::{ErrorKind, ServiceError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No route for {0}")]
    RouteNotFound(String),

    #[error("Invalid path variable '{raw}': {details}")]
    InvalidPathVariable { raw: String, details: String },

    #[error("Malformed request body")]
    MalformedBody,

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Failure envelope: `{"status":"Failed","status_code":"404","error":{...}}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub status_code: String,
    pub error: ErrorObject,
}

#[derive(Debug, Serialize)]
pub struct ErrorObject {
    #[serde(rename = "type")]
    pub error_type: &'static str,
    pub message: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl AppError {
    /// Storage failures are reported as 400 like every other non-missing case.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidPathVariable { .. } | AppError::MalformedBody => {
                StatusCode::BAD_REQUEST
            }
            AppError::Service(e) if e.kind == ErrorKind::ResourceNotFound => StatusCode::NOT_FOUND,
            AppError::Service(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn into_error_object(self) -> ErrorObject {
        let now = Utc::now();
        match self {
            AppError::RouteNotFound(path) => ErrorObject {
                error_type: "NOT_FOUND",
                message: "Could not find the requested URL.".to_string(),
                details: format!("The URL '{}' does not exist.", path),
                timestamp: now,
            },
            AppError::InvalidPathVariable { raw, details } => ErrorObject {
                error_type: "BAD_REQUEST",
                message: format!("Error parsing the path variable '{}' on the URL.", raw),
                details,
                timestamp: now,
            },
            AppError::MalformedBody => ErrorObject {
                error_type: "BAD_REQUEST",
                message: "The request is malformed.".to_string(),
                details: "The body of the request may have an incorrect format.".to_string(),
                timestamp: now,
            },
            AppError::Service(e) => ErrorObject {
                error_type: e.kind.as_str(),
                message: e.message,
                details: e.details,
                timestamp: e.timestamp,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Service(e) if status != StatusCode::NOT_FOUND => {
                tracing::warn!("Request failed with {}: {}", e.kind, e.details);
            }
            _ => tracing::debug!("Request rejected: {}", self),
        }

        let body = ErrorResponse {
            status: "Failed",
            status_code: status.as_u16().to_string(),
            error: self.into_error_object(),
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn response_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn response_json(err: AppError) -> Value {
        let body = err.into_response().into_body();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn service_error(kind: ErrorKind) -> AppError {
        AppError::Service(ServiceError::new(kind, "message", "details"))
    }

    #[test]
    fn route_not_found_returns_404() {
        assert_eq!(
            response_status(AppError::RouteNotFound("/nope".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn request_shape_errors_return_400() {
        assert_eq!(
            response_status(AppError::MalformedBody),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            response_status(AppError::InvalidPathVariable {
                raw: "abc".into(),
                details: "invalid digit found in string".into(),
            }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn resource_not_found_returns_404() {
        assert_eq!(
            response_status(service_error(ErrorKind::ResourceNotFound)),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn other_service_errors_return_400() {
        for kind in [
            ErrorKind::EmptyFields,
            ErrorKind::RepeatedEmail,
            ErrorKind::ErrorHashingPassword,
            ErrorKind::ErrorCreatingUser,
            ErrorKind::ErrorDeletingPost,
        ] {
            assert_eq!(response_status(service_error(kind)), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn envelope_has_failed_status_and_typed_error() {
        let json = response_json(service_error(ErrorKind::RepeatedEmail)).await;
        assert_eq!(json["status"], "Failed");
        assert_eq!(json["status_code"], "400");
        assert_eq!(json["error"]["type"], "REPEATED_EMAIL");
        assert_eq!(json["error"]["message"], "message");
        assert_eq!(json["error"]["details"], "details");
        assert!(json["error"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn route_not_found_names_the_path() {
        let json = response_json(AppError::RouteNotFound("/api/v1/nope".into())).await;
        assert_eq!(json["status_code"], "404");
        assert_eq!(json["error"]["type"], "NOT_FOUND");
        assert_eq!(
            json["error"]["details"],
            "The URL '/api/v1/nope' does not exist."
        );
    }
}

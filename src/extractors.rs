use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Numeric `{id}` path segment.
///
/// Only one-or-more ASCII digits are accepted; anything else is rejected with
/// a 400 before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub i64);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidPathVariable {
                raw: String::new(),
                details: rejection.body_text(),
            })?;

        parse_id(&raw).map(ResourceId)
    }
}

pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::InvalidPathVariable {
            raw: raw.to_string(),
            details: format!("invalid digit found in '{}'", raw),
        });
    }

    raw.parse::<i64>()
        .map_err(|e| AppError::InvalidPathVariable {
            raw: raw.to_string(),
            details: e.to_string(),
        })
}

/// JSON request body decoded regardless of `Content-Type`.
///
/// Every decoding failure maps to the same `BAD_REQUEST` error so clients are
/// not told which field failed.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!("Failed to read request body: {}", rejection);
            AppError::MalformedBody
        })?;

        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            tracing::debug!("Failed to decode request body: {}", e);
            AppError::MalformedBody
        })
    }
}

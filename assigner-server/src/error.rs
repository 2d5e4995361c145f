//! HTTP error responses and request extractors
//!
//! Domain errors are translated to status codes here and nowhere else.
//! Extraction failures are reported as `INVALID_REQUEST`.

use assigner_core::ErrorCode;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Code reported for malformed requests
pub const INVALID_REQUEST: &str = "INVALID_REQUEST";

/// Code reported when a request exceeds the configured timeout
pub const REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT";

/// Error returned by handlers
#[derive(Debug)]
pub enum ApiError {
    /// Classified domain failure
    Domain(assigner_core::Error),

    /// Request body or query could not be used
    InvalidRequest(String),

    /// Request did not finish in time
    Timeout,
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest(message.into())
    }
}

/// HTTP status for a domain error code
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::TeamExists => StatusCode::BAD_REQUEST,
        ErrorCode::PrExists
        | ErrorCode::PrMerged
        | ErrorCode::NotAssigned
        | ErrorCode::NoCandidate => StatusCode::CONFLICT,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalIssue => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Domain(err) => {
                let code = err.code();
                tracing::debug!(code = %code, error = %err, "Request rejected");
                (status_for(code), code.as_str(), code.message().to_string())
            }
            ApiError::InvalidRequest(message) => {
                (StatusCode::BAD_REQUEST, INVALID_REQUEST, message)
            }
            ApiError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                REQUEST_TIMEOUT,
                "request timed out, please try again".to_string(),
            ),
        };

        (
            status,
            Json(ErrorBody {
                error: ErrorDetail { code, message },
            }),
        )
            .into_response()
    }
}

impl From<assigner_core::Error> for ApiError {
    fn from(err: assigner_core::Error) -> Self {
        ApiError::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Invalid JSON body");
        ApiError::invalid("invalid JSON")
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Invalid query string");
        ApiError::invalid("required query parameter is missing")
    }
}

/// JSON body extractor that rejects with [`ApiError`]
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query extractor that rejects with [`ApiError`]
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Result type for handlers
pub type ApiResult<T> = std::result::Result<T, ApiError>;

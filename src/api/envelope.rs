//! Response envelope for the operator API.
//!
//! Success: `{ "data": T, "meta": { ... } }`.
//! Failure: `{ "error": { "code", "message", "details"? }, "meta": { ... } }`,
//! with `code` drawn from [`ErrorCode`] so clients can branch without parsing
//! messages.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;

/// Operator API revision, bumped on breaking changes to any payload.
pub const API_VERSION: &str = "1";

/// Metadata included in every response.
#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub timestamp: String,
    pub api_version: &'static str,
    pub node_version: &'static str,
}

impl Default for ResponseMeta {
    fn default() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            api_version: API_VERSION,
            node_version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Response {
        let body = Self {
            data,
            meta: ResponseMeta::default(),
        };
        (StatusCode::OK, axum::Json(body)).into_response()
    }
}

/// Failure classes of the operator surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The dispatch loop has not produced this output yet
    NoData,
    /// Request body is not valid JSON for the endpoint
    MalformedBody,
    /// Settings parsed but failed validation
    InvalidSettings,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NoData => StatusCode::NOT_FOUND,
            ErrorCode::MalformedBody | ErrorCode::InvalidSettings => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: ErrorCode,
    pub message: String,
    /// One entry per violated rule
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ErrorDetail,
    pub meta: ResponseMeta,
}

impl ApiErrorResponse {
    fn build(code: ErrorCode, message: String, details: Vec<String>) -> Response {
        let body = Self {
            error: ErrorDetail {
                code,
                message,
                details,
            },
            meta: ResponseMeta::default(),
        };
        (code.status(), axum::Json(body)).into_response()
    }

    pub fn no_data(msg: impl Into<String>) -> Response {
        Self::build(ErrorCode::NoData, msg.into(), Vec::new())
    }

    pub fn malformed_body(msg: impl Into<String>) -> Response {
        Self::build(ErrorCode::MalformedBody, msg.into(), Vec::new())
    }

    /// 400 listing every violation; the message joins them for plain clients.
    pub fn invalid_settings(errors: Vec<String>) -> Response {
        Self::build(ErrorCode::InvalidSettings, errors.join("; "), errors)
    }
}

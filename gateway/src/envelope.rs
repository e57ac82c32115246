//! Uniform response envelope.
//!
//! Every JSON response is either
//! `{ "success": true, "result": ... }` or
//! `{ "success": false, "error": "<HTTP reason>", "message": "<detail>" }`.
//!
//! How a [`GatewayError`] maps to a status code is chosen by [`StatusPolicy`]:
//!
//! | Error | `typed` | `legacy` |
//! |-------|---------|----------|
//! | Validation | 400 | 500 |
//! | ChainNotSupported | 404 | 500 |
//! | Backend | 502 | 500 |
//! | Internal | 500 | 500 |

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatch::GatewayError;

/// Successful envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Success<T> {
    /// Always `true`.
    pub success: bool,
    /// Backend result, unchanged.
    pub result: T,
}

impl<T> Success<T> {
    /// Wraps a result.
    pub const fn new(result: T) -> Self {
        Self {
            success: true,
            result,
        }
    }
}

/// Failure envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Failure {
    /// Always `false`.
    pub success: bool,
    /// Canonical reason phrase of the HTTP status.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}

/// Status code mapping for failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    /// Client errors → 4xx, backend failures → 502, internal faults → 500.
    #[default]
    Typed,
    /// Every failure → 500, as existing clients of the gateway expect.
    Legacy,
}

impl StatusPolicy {
    /// Status code for `error` under this policy.
    #[must_use]
    pub const fn status(self, error: &GatewayError) -> StatusCode {
        match (self, error) {
            (Self::Legacy, _) | (Self::Typed, GatewayError::Internal(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            (Self::Typed, GatewayError::Validation(_)) => StatusCode::BAD_REQUEST,
            (Self::Typed, GatewayError::ChainNotSupported(_)) => StatusCode::NOT_FOUND,
            (Self::Typed, GatewayError::Backend(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Renders a dispatch outcome as an HTTP response.
pub fn respond(policy: StatusPolicy, outcome: Result<Value, GatewayError>) -> Response {
    match outcome {
        Ok(result) => (StatusCode::OK, Json(Success::new(result))).into_response(),
        Err(error) => failure(policy, &error),
    }
}

/// Renders a failure envelope.
pub fn failure(policy: StatusPolicy, error: &GatewayError) -> Response {
    status_failure(policy.status(error), error.to_string())
}

/// Failure envelope for a status chosen outside the dispatcher, such as an
/// unrouted path.
pub fn status_failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Failure {
        success: false,
        error: status
            .canonical_reason()
            .unwrap_or("Internal Server Error")
            .to_owned(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

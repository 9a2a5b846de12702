//! Handler errors and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use reportvault_core::error::{FetchErrorKind, ReportError};

/// Error returned by every handler, rendered as `{"error": {...}}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
    cid: Option<String>,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
            cid: None,
        }
    }

    /// 400: the request body could not be parsed.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "BAD_REQUEST")
    }

    /// 404: the gateway has no such content.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, "NOT_FOUND")
    }

    /// 500: details stay in the logs.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// 422: required input missing or rejected.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message, "VALIDATION_ERROR")
    }

    /// Upstream (pinning service or gateway) error.
    pub fn bad_gateway(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message, code)
    }

    /// Attaches the CID the error concerns.
    pub fn with_cid(mut self, cid: impl Into<String>) -> Self {
        self.cid = Some(cid.into());
        self
    }

    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Wire shape of an error response.
#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cid: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                cid: self.cid,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match &err {
            ReportError::Validation(_) => ApiError::validation(err.to_string()),
            ReportError::Upload { .. } => {
                tracing::warn!(error = %err, "Pinning failed");
                ApiError::bad_gateway(err.to_string(), "UPLOAD_FAILED")
            }
            ReportError::LedgerRecord { pin, .. } => {
                let cid = pin.content_identifier.clone();
                tracing::error!(cid = %cid, error = %err, "Report pinned but not recorded");
                ApiError::bad_gateway(err.to_string(), "LEDGER_RECORD_FAILED").with_cid(cid)
            }
            ReportError::Fetch { cid, kind, .. } => {
                let cid = cid.clone();
                match kind {
                    FetchErrorKind::NotFound | FetchErrorKind::InvalidIdentifier => {
                        ApiError::not_found(err.to_string()).with_cid(cid)
                    }
                    _ => ApiError::bad_gateway(err.to_string(), "FETCH_FAILED").with_cid(cid),
                }
            }
            ReportError::Config(_) => {
                tracing::error!(error = %err, "Server misconfigured");
                ApiError::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Pinning service is not configured",
                    "NOT_CONFIGURED",
                )
            }
            _ => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

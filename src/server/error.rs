use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::transform::{Severity, TransformError};

/// Errors returned by HTTP handlers, rendered as `{"error": "<message>"}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// 400
    #[error("{0}")]
    BadRequest(String),

    /// 404
    #[error("{0}")]
    NotFound(String),

    /// 413
    #[error("{0}")]
    TooLarge(String),

    /// 500
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Client faults become 400, server faults 500.
    pub fn with_severity(severity: Severity, msg: String) -> Self {
        match severity {
            Severity::Client => ApiError::BadRequest(msg),
            Severity::Server => ApiError::Internal(msg),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(msg) = &self {
            tracing::error!("internal error: {}", msg);
        }
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<TransformError> for ApiError {
    fn from(err: TransformError) -> Self {
        ApiError::with_severity(err.severity(), err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(format!("{:#}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalField;
    use crate::transform::ParseError;

    #[test]
    fn test_severity_maps_to_status() {
        let client = ApiError::with_severity(Severity::Client, "bad".into());
        let server = ApiError::with_severity(Severity::Server, "boom".into());
        assert_eq!(client.status(), StatusCode::BAD_REQUEST);
        assert_eq!(server.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(server.to_string(), "boom");
    }

    #[test]
    fn test_transform_error_is_bad_request() {
        let err: ApiError = TransformError::Parse(ParseError::Number {
            row: 2,
            field: CanonicalField::High,
            value: "x".into(),
        })
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "row 2: cannot parse 'x' in column 'High' as a number");
    }
}

//! HTTP error mapping.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use fila_core::FilaError;
use serde_json::json;
use tracing::{error, warn};

/// Error returned by API handlers.
#[derive(Debug)]
pub struct ApiError(pub FilaError);

impl From<FilaError> for ApiError {
    fn from(err: FilaError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            FilaError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            FilaError::Unidentified(_) => StatusCode::UNAUTHORIZED,
            FilaError::Forbidden(_) => StatusCode::FORBIDDEN,
            FilaError::NotFound(_) => StatusCode::NOT_FOUND,
            FilaError::AlreadyCalled(_) => StatusCode::CONFLICT,
            FilaError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self.0 {
            FilaError::Forbidden(msg) => warn!(%msg, "Forbidden request"),
            e if status.is_server_error() => error!(error = %e, "Request failed"),
            _ => {}
        }

        let body = Json(json!({
            "error": self.0.kind(),
            "message": self.0.to_string(),
        }));

        if self.0.is_retryable() {
            (status, [(header::RETRY_AFTER, "1")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (FilaError::invalid("x"), StatusCode::BAD_REQUEST),
            (FilaError::Unidentified("x".into()), StatusCode::UNAUTHORIZED),
            (FilaError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (FilaError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (FilaError::AlreadyCalled("x".into()), StatusCode::CONFLICT),
            (FilaError::Unavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (FilaError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[test]
    fn test_unavailable_sets_retry_after() {
        let response = ApiError(FilaError::Unavailable("pool".into())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "1");
    }
}

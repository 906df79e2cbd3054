//! Inbound request errors.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors raised before a request reaches the gateway layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    Json(#[from] JsonRejection),

    #[error("Invalid request: {0}")]
    Query(#[from] QueryRejection),

    #[error("Invalid request: {0}")]
    Path(#[from] PathRejection),
}

impl ApiError {
    /// Every malformed inbound request is a 400, whatever axum's own
    /// rejection would have used (415, 422, ...).
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        tracing::debug!(status = %status, %message, "Rejected inbound request");
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/device")
            .body(Body::from(r#"{"apiKey":"k"}"#))
            .unwrap();
        let rejection = axum::Json::<serde_json::Value>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(rejection.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let err = ApiError::from(rejection);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}

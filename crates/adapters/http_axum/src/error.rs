//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use storefront_domain::error::ShopError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`ShopError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(ShopError);

impl From<ShopError> for ApiError {
    fn from(err: ShopError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            ShopError::Validation(_) | ShopError::Cursor(_) => StatusCode::BAD_REQUEST,
            ShopError::NotFound(_) => StatusCode::NOT_FOUND,
            ShopError::State(_) => StatusCode::CONFLICT,
            ShopError::Credential(_) | ShopError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            ShopError::Validation(err) => err.to_string(),
            ShopError::NotFound(err) => err.to_string(),
            ShopError::State(err) => err.to_string(),
            ShopError::Cursor(err) => err.to_string(),
            ShopError::Credential(err) => {
                tracing::error!(error = %err, "credential error");
                "internal server error".to_string()
            }
            ShopError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                "internal server error".to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

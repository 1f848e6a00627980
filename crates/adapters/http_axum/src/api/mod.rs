//! JSON API handler modules, one sub-router per service.

#[allow(clippy::missing_errors_doc)]
pub mod orders;
#[allow(clippy::missing_errors_doc)]
pub mod products;
#[allow(clippy::missing_errors_doc)]
pub mod users;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// `201 Created` with the new record as body.
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// `204 No Content`.
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

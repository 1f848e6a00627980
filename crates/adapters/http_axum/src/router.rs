//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

/// Build the top-level axum [`Router`].
///
/// `api` is the merge of whichever service sub-routers are enabled; it is
/// nested under `/api`. Includes a [`TraceLayer`] that logs each HTTP
/// request/response at the `DEBUG` level using the `tracing` ecosystem.
pub fn build(api: Router) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}

//! # storefront-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a JSON API for the product, order and user services
//!   (`/api/products`, `/api/orders`, `/api/users`, …)
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map service errors into status codes and `{"error": …}` bodies
//!
//! Each service contributes its own sub-router carrying its own state, so a
//! deployment can mount any subset of them.
//!
//! ## Dependency rule
//! Depends on `storefront-app` (for port traits and services) and
//! `storefront-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
mod error;
pub mod router;

pub use error::ApiError;

//! # storefrontd: storefront daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`storefront.toml` plus environment overrides)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository implementations (adapters)
//! - Construct application services, injecting repositories via port traits
//! - Mount one axum sub-router per enabled service
//! - Bind to a TCP port and serve until SIGTERM/SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer. No domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing_subscriber::EnvFilter;

use storefront_adapter_http_axum::{api, router};
use storefront_adapter_storage_sqlite_sqlx::{
    Database, SqliteOrderRepository, SqliteProductRepository, SqliteUserRepository,
};
use storefront_app::services::order_service::OrderService;
use storefront_app::services::product_service::ProductService;
use storefront_app::services::user_service::UserService;

use crate::config::{Config, ServicesConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let db = storefront_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
    }
    .build()
    .await
    .context("failed to initialize database")?;

    let app = router::build(api_routes(&config.services, &db));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(
        addr = %bind_addr,
        products = config.services.products,
        orders = config.services.orders,
        users = config.services.users,
        "storefrontd listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("storefrontd stopped");
    Ok(())
}

/// Merge the sub-routers of every enabled service.
fn api_routes(services: &ServicesConfig, db: &Database) -> Router {
    let mut api = Router::new();
    if services.products {
        let repo = SqliteProductRepository::new(db.pool().clone());
        api = api.merge(api::products::routes(Arc::new(ProductService::new(repo))));
    }
    if services.orders {
        let repo = SqliteOrderRepository::new(db.pool().clone());
        api = api.merge(api::orders::routes(Arc::new(OrderService::new(repo))));
    }
    if services.users {
        let repo = SqliteUserRepository::new(db.pool().clone());
        api = api.merge(api::users::routes(Arc::new(UserService::new(repo))));
    }
    api
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => Some(stream),
        Err(err) => {
            tracing::warn!(error = %err, "unable to install SIGTERM handler");
            None
        }
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                tracing::warn!(error = %err, "unable to listen for Ctrl+C");
            }
            tracing::info!("received Ctrl+C, shutting down");
        }
        () = async {
            match terminate.as_mut() {
                Some(stream) => {
                    stream.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        } => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "unable to listen for Ctrl+C");
    }
    tracing::info!("received Ctrl+C, shutting down");
}

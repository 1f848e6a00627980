//! # storefront-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `storefront-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `storefront-app` (for port traits) and `storefront-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod order_repo;
mod pool;
mod product_repo;
mod user_repo;

pub use error::StorageError;
pub use order_repo::SqliteOrderRepository;
pub use pool::{Config, Database};
pub use product_repo::SqliteProductRepository;
pub use user_repo::SqliteUserRepository;

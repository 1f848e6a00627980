//! Storage-specific error type wrapping sqlx errors.

use storefront_domain::error::{ShopError, StoreError};

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for ShopError {
    fn from(err: StorageError) -> Self {
        Self::Storage(StoreError::new(err))
    }
}

/// Turn a column-level parse failure into a decode error.
pub(crate) fn decode<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

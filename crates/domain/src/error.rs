//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`ShopError`]
//! via `#[from]`. Adapters box their own error type into [`StoreError`] so
//! the domain never depends on a database crate.

use std::fmt;

/// Top-level error returned by every service operation.
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    /// Malformed or missing input, correctable by the caller.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// No record matches the given key.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The operation would break an invariant or change nothing.
    #[error("invalid state")]
    State(#[from] StateError),

    /// A pagination cursor could not be decoded.
    #[error("invalid cursor")]
    Cursor(#[from] CursorError),

    /// Password hashing or verification failed.
    #[error("credential error")]
    Credential(#[from] CredentialError),

    /// The underlying store failed.
    #[error("storage error")]
    Storage(#[from] StoreError),
}

/// Input rejected before touching the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("user id must not be empty")]
    EmptyUserId,
    #[error("at least one product id is required")]
    NoProductIds,
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,
    #[error("total price cannot be negative")]
    NegativeTotalPrice,
    #[error("name must not be empty")]
    EmptyName,
    #[error("price must be greater than zero")]
    NonPositivePrice,
    #[error("inventory cannot be negative")]
    NegativeInventory,
    #[error("restock amount must be greater than zero")]
    NonPositiveRestock,
    #[error("restock would overflow the product inventory")]
    InventoryOverflow,
    #[error("either id or name must be provided")]
    MissingDeleteKey,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("password must not be empty")]
    EmptyPassword,
}

/// A lookup by key matched no record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// Kind of record that was looked up (`"Order"`, `"Product"`, ...).
    pub entity: &'static str,
    /// Key used for the lookup.
    pub id: String,
}

/// Business-rule violations detected against the current record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// The requested value is already the current one.
    #[error("product availability is already set to {0}")]
    Unchanged(bool),
    /// A product cannot be made available without stock.
    #[error("cannot mark product as available with zero inventory")]
    NoInventory,
}

/// Why a pagination cursor was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CursorError {
    #[error("cursor is not valid base64")]
    Encoding,
    #[error("cursor does not contain a valid identifier")]
    Identifier,
}

/// Password hashing or verification failure.
#[derive(Debug, thiserror::Error)]
#[error("password hash error: {0}")]
pub struct CredentialError(pub argon2::password_hash::Error);

/// Opaque failure reported by a store adapter.
pub struct StoreError(Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
    /// Wrap an adapter-specific error.
    #[must_use]
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }
}

impl fmt::Debug for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref())
    }
}

impl ShopError {
    /// Shorthand for a [`NotFoundError`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        NotFoundError {
            entity,
            id: id.into(),
        }
        .into()
    }
}

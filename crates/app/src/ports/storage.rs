//! Storage port: repository traits for persistence.
//!
//! Every multi-step mutation (patch then re-read, restock, guarded
//! availability flip, order plus associations) is a single method here so
//! that an adapter can run it as one statement or one transaction.

use std::future::Future;

use storefront_domain::error::ShopError;
use storefront_domain::id::{OrderId, ProductId, UserId};
use storefront_domain::order::{Order, OrderPatch};
use storefront_domain::product::{Product, ProductKey, ProductPatch};
use storefront_domain::user::{User, UserPatch};

/// Repository for orders and their product associations.
pub trait OrderRepository {
    /// Persist an order and its product associations atomically, returning
    /// the stored record with associations loaded.
    fn create(&self, order: Order) -> impl Future<Output = Result<Order, ShopError>> + Send;

    /// Get an order by id, associations loaded.
    fn get_by_id(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, ShopError>> + Send;

    /// Get every order, associations loaded.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Order>, ShopError>> + Send;

    /// Get the orders owned by `user_id`, oldest first, associations loaded.
    fn find_by_user_id(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Order>, ShopError>> + Send;

    /// Apply the present fields of `patch` and return the re-read record,
    /// or `None` when no order has this id.
    fn update(
        &self,
        id: OrderId,
        patch: OrderPatch,
    ) -> impl Future<Output = Result<Option<Order>, ShopError>> + Send;

    /// Delete the order matching both `id` and `user_id`, returning the
    /// number of rows removed.
    fn delete(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> impl Future<Output = Result<u64, ShopError>> + Send;

    /// Number of stored orders.
    fn count(&self) -> impl Future<Output = Result<u64, ShopError>> + Send;
}

/// Repository for catalogue products.
pub trait ProductRepository {
    /// Persist a new product.
    fn create(&self, product: Product) -> impl Future<Output = Result<Product, ShopError>> + Send;

    /// Get a product by id.
    fn get_by_id(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, ShopError>> + Send;

    /// Get every product, ordered by id.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Product>, ShopError>> + Send;

    /// Get at most `limit` products with an id strictly greater than
    /// `after` (or from the start), ordered by id ascending.
    fn get_page(
        &self,
        after: Option<ProductId>,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<Product>, ShopError>> + Send;

    /// Number of stored products.
    fn count(&self) -> impl Future<Output = Result<u64, ShopError>> + Send;

    /// Apply the present fields of `patch` atomically and return the re-read
    /// record, or `None` when no product has this id.
    fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> impl Future<Output = Result<Option<Product>, ShopError>> + Send;

    /// Add a positive `quantity` to the inventory in one step, returning the
    /// updated record.
    ///
    /// Returns `None`, leaving the row untouched, when no product has this id
    /// or when the new inventory would not fit in an `i64`.
    fn restock(
        &self,
        id: ProductId,
        quantity: i64,
    ) -> impl Future<Output = Result<Option<Product>, ShopError>> + Send;

    /// Set the availability flag only if it still equals `expected` and,
    /// when turning it on, the inventory is positive.
    ///
    /// Returns `None` when the guard did not hold (or the product is gone).
    fn set_available(
        &self,
        id: ProductId,
        expected: bool,
        available: bool,
    ) -> impl Future<Output = Result<Option<Product>, ShopError>> + Send;

    /// Delete by id or by name, returning the number of rows removed.
    fn delete(&self, key: ProductKey) -> impl Future<Output = Result<u64, ShopError>> + Send;
}

/// Repository for user accounts.
pub trait UserRepository {
    /// Persist a new user.
    fn create(&self, user: User) -> impl Future<Output = Result<User, ShopError>> + Send;

    /// Get a user by id.
    fn get_by_id(&self, id: UserId)
    -> impl Future<Output = Result<Option<User>, ShopError>> + Send;

    /// Get every user, ordered by id.
    fn get_all(&self) -> impl Future<Output = Result<Vec<User>, ShopError>> + Send;

    /// Apply the present fields of `patch` and return the re-read record,
    /// or `None` when no user has this id.
    fn update(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> impl Future<Output = Result<Option<User>, ShopError>> + Send;

    /// Delete a user by id, returning the number of rows removed.
    fn delete(&self, id: UserId) -> impl Future<Output = Result<u64, ShopError>> + Send;

    /// Number of stored users.
    fn count(&self) -> impl Future<Output = Result<u64, ShopError>> + Send;
}

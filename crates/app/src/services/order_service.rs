//! Order service: use-cases for placing and managing orders.

use storefront_domain::error::ShopError;
use storefront_domain::id::{OrderId, UserId};
use storefront_domain::order::{NewOrder, Order, OrderPatch};

use crate::ports::OrderRepository;

/// Application service for orders.
pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Place an order.
    ///
    /// Product ids are recorded as given; they are not checked against the
    /// catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] when the input is rejected, or a
    /// storage error. Nothing is stored on failure.
    #[tracing::instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create_order(&self, input: NewOrder) -> Result<Order, ShopError> {
        let order = input.into_order()?;
        let created = self.repo.create(order).await?;
        tracing::info!(
            order_id = %created.id,
            products = created.products.len(),
            "order created"
        );
        Ok(created)
    }

    /// Look up an order by id.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::NotFound`] when no order has this id, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ShopError> {
        self.repo
            .get_by_id(id.clone())
            .await?
            .ok_or_else(|| ShopError::not_found("Order", id))
    }

    /// List every order.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_orders(&self) -> Result<Vec<Order>, ShopError> {
        self.repo.get_all().await
    }

    /// List the orders placed by `user_id`. An unknown user simply has none.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, ShopError> {
        self.repo.find_by_user_id(user_id).await
    }

    /// Change the status, quantity or total price of an order.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] when a present value breaks the
    /// creation rules, [`ShopError::NotFound`] when the order does not
    /// exist, or a storage error.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<Order, ShopError> {
        patch.validate()?;
        if patch.is_empty() {
            return self.get_order(id).await;
        }
        let updated = self
            .repo
            .update(id.clone(), patch)
            .await?
            .ok_or_else(|| ShopError::not_found("Order", id))?;
        tracing::info!(order_id = %updated.id, status = %updated.status, "order updated");
        Ok(updated)
    }

    /// Delete an order owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::NotFound`] when no order matches both the id and
    /// the owner, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId, user_id: UserId) -> Result<(), ShopError> {
        let deleted = self.repo.delete(id.clone(), user_id).await?;
        if deleted == 0 {
            return Err(ShopError::not_found("Order", id));
        }
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }

    /// Total number of orders.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn count_orders(&self) -> Result<u64, ShopError> {
        self.repo.count().await
    }
}

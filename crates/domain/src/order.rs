//! Order: a user's purchase of one or more products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ShopError, ValidationError};
use crate::id::{OrderId, ProductId, UserId};
use crate::time::{Timestamp, now};

/// A product referenced by an order, as loaded through the association.
///
/// `name` is `None` when the association points at a product id that has
/// no row in the product table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProduct {
    pub id: ProductId,
    pub name: Option<String>,
}

impl OrderProduct {
    /// Association known only by id.
    #[must_use]
    pub fn unresolved(id: ProductId) -> Self {
        Self { id, name: None }
    }
}

/// A placed order.
///
/// `status` is free-form text (`pending`, `shipped`, `completed`, ...); no
/// transition graph is enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub products: Vec<OrderProduct>,
    pub quantity: i64,
    pub total_price: Decimal,
    pub status: String,
    pub created_at: Timestamp,
}

impl Order {
    /// Ids of the associated products, in association order.
    pub fn product_ids(&self) -> impl Iterator<Item = &ProductId> {
        self.products.iter().map(|product| &product.id)
    }
}

fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity <= 0 {
        return Err(ValidationError::NonPositiveQuantity);
    }
    Ok(())
}

fn validate_total_price(total_price: Decimal) -> Result<(), ValidationError> {
    if total_price < Decimal::ZERO {
        return Err(ValidationError::NegativeTotalPrice);
    }
    Ok(())
}

fn default_status() -> String {
    "pending".to_string()
}

/// Input for placing an order.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub product_ids: Vec<ProductId>,
    pub quantity: i64,
    #[serde(default)]
    pub total_price: Decimal,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl NewOrder {
    /// Validate the input and turn it into a fresh [`Order`].
    ///
    /// Blank product ids are dropped and duplicates collapsed, keeping the
    /// first occurrence. The creation time defaults to now.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] when the user id is blank, no usable
    /// product id remains, the quantity is not positive, or the total price
    /// is negative.
    pub fn into_order(self) -> Result<Order, ShopError> {
        if self.user_id.is_blank() {
            return Err(ValidationError::EmptyUserId.into());
        }

        let mut product_ids: Vec<ProductId> = Vec::with_capacity(self.product_ids.len());
        for id in self.product_ids {
            if !id.is_blank() && !product_ids.contains(&id) {
                product_ids.push(id);
            }
        }
        if product_ids.is_empty() {
            return Err(ValidationError::NoProductIds.into());
        }

        validate_quantity(self.quantity)?;
        validate_total_price(self.total_price)?;

        Ok(Order {
            id: OrderId::generate(),
            user_id: self.user_id,
            products: product_ids
                .into_iter()
                .map(OrderProduct::unresolved)
                .collect(),
            quantity: self.quantity,
            total_price: self.total_price,
            status: self.status,
            created_at: self.created_at.unwrap_or_else(now),
        })
    }
}

/// Field update set for an order. Only status, quantity and price can change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrderPatch {
    pub quantity: Option<i64>,
    pub total_price: Option<Decimal>,
    pub status: Option<String>,
}

impl OrderPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.total_price.is_none() && self.status.is_none()
    }

    /// Check the present values against the creation rules.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] for a non-positive quantity or a
    /// negative total price.
    pub fn validate(&self) -> Result<(), ShopError> {
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        if let Some(total_price) = self.total_price {
            validate_total_price(total_price)?;
        }
        Ok(())
    }

    /// Apply the present fields to `order`, leaving the others as they are.
    pub fn apply_to(&self, order: &mut Order) {
        if let Some(quantity) = self.quantity {
            order.quantity = quantity;
        }
        if let Some(total_price) = self.total_price {
            order.total_price = total_price;
        }
        if let Some(status) = &self.status {
            order.status.clone_from(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_order() -> NewOrder {
        NewOrder {
            user_id: UserId::from("1"),
            product_ids: vec![ProductId::from("101")],
            quantity: 2,
            total_price: Decimal::new(4999, 2),
            status: "pending".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn should_echo_input_when_valid() {
        let order = new_order().into_order().unwrap();
        assert!(!order.id.is_blank());
        assert_eq!(order.user_id.as_str(), "1");
        assert_eq!(order.quantity, 2);
        assert_eq!(order.total_price, Decimal::new(4999, 2));
        assert_eq!(order.status, "pending");
        assert_eq!(
            order.product_ids().collect::<Vec<_>>(),
            vec![&ProductId::from("101")]
        );
    }

    #[test]
    fn should_reject_when_user_id_is_empty() {
        let mut input = new_order();
        input.user_id = UserId::from("");
        assert!(matches!(
            input.into_order(),
            Err(ShopError::Validation(ValidationError::EmptyUserId))
        ));
    }

    #[test]
    fn should_reject_when_product_ids_are_all_blank() {
        let mut input = new_order();
        input.product_ids = vec![ProductId::from(""), ProductId::from(" ")];
        assert!(matches!(
            input.into_order(),
            Err(ShopError::Validation(ValidationError::NoProductIds))
        ));
    }

    #[test]
    fn should_reject_when_quantity_is_zero() {
        let mut input = new_order();
        input.quantity = 0;
        assert!(matches!(
            input.into_order(),
            Err(ShopError::Validation(ValidationError::NonPositiveQuantity))
        ));
    }

    #[test]
    fn should_reject_when_total_price_is_negative() {
        let mut input = new_order();
        input.total_price = Decimal::new(-1, 2);
        assert!(matches!(
            input.into_order(),
            Err(ShopError::Validation(ValidationError::NegativeTotalPrice))
        ));
    }

    #[test]
    fn should_drop_blank_and_duplicate_product_ids() {
        let mut input = new_order();
        input.product_ids = vec!["p1".into(), "".into(), "p2".into(), "p1".into()];
        let order = input.into_order().unwrap();
        let ids: Vec<&str> = order.product_ids().map(ProductId::as_str).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[test]
    fn should_default_status_to_pending_when_missing_from_json() {
        let input: NewOrder =
            serde_json::from_str(r#"{"user_id":"1","product_ids":["p1"],"quantity":1}"#).unwrap();
        assert_eq!(input.status, "pending");
        assert_eq!(input.total_price, Decimal::ZERO);
    }

    #[test]
    fn should_only_touch_present_fields_when_applying_patch() {
        let mut order = new_order().into_order().unwrap();
        let before = order.clone();
        let patch = OrderPatch {
            status: Some("shipped".to_string()),
            ..OrderPatch::default()
        };

        patch.apply_to(&mut order);

        assert_eq!(order.status, "shipped");
        assert_eq!(order.quantity, before.quantity);
        assert_eq!(order.total_price, before.total_price);
        assert_eq!(order.created_at, before.created_at);
    }

    #[test]
    fn should_reject_patch_with_zero_quantity() {
        let patch = OrderPatch {
            quantity: Some(0),
            ..OrderPatch::default()
        };
        assert!(patch.validate().is_err());
    }
}

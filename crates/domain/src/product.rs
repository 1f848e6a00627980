//! Product: a catalogue item with a price, a stock level and an availability flag.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ShopError, ValidationError};
use crate::id::ProductId;

/// A catalogue item.
///
/// `available` is derived from `inventory` at creation time only. After
/// that it moves independently and the `available ⇒ inventory > 0` rule is
/// enforced solely when the flag is explicitly set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    pub inventory: i64,
    pub available: bool,
}

impl Product {
    /// Create a builder for constructing a [`Product`].
    #[must_use]
    pub fn builder() -> ProductBuilder {
        ProductBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] when `name` is blank, `price` is not
    /// strictly positive, or `inventory` is negative.
    pub fn validate(&self) -> Result<(), ShopError> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        validate_inventory(self.inventory)?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    if price <= Decimal::ZERO {
        return Err(ValidationError::NonPositivePrice);
    }
    Ok(())
}

fn validate_inventory(inventory: i64) -> Result<(), ValidationError> {
    if inventory < 0 {
        return Err(ValidationError::NegativeInventory);
    }
    Ok(())
}

/// Step-by-step builder for [`Product`].
#[derive(Debug, Default)]
pub struct ProductBuilder {
    id: Option<ProductId>,
    name: Option<String>,
    price: Option<Decimal>,
    description: Option<String>,
    inventory: i64,
    available: Option<bool>,
}

impl ProductBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<ProductId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn inventory(mut self, inventory: i64) -> Self {
        self.inventory = inventory;
        self
    }

    /// Override the availability derived from inventory.
    #[must_use]
    pub fn available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    /// Consume the builder, validate, and return a [`Product`].
    ///
    /// When no id is given a fresh one is generated. When availability is not
    /// given it is `inventory > 0`.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] if any invariant fails.
    pub fn build(self) -> Result<Product, ShopError> {
        let product = Product {
            id: self.id.unwrap_or_else(ProductId::generate),
            name: self.name.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            description: self.description,
            inventory: self.inventory,
            available: self.available.unwrap_or(self.inventory > 0),
        };
        product.validate()?;
        Ok(product)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub inventory: i64,
}

impl NewProduct {
    /// Validate the input and turn it into a fresh [`Product`].
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] when the name is blank, the price is
    /// not positive, or the inventory is negative.
    pub fn into_product(self) -> Result<Product, ShopError> {
        let mut builder = Product::builder()
            .name(self.name)
            .price(self.price)
            .inventory(self.inventory);
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        builder.build()
    }
}

/// Field update set for a product.
///
/// `None` leaves a field untouched. `description` is nullable, so
/// `Some(None)` clears it while `None` keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    #[serde(deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub inventory: Option<i64>,
}

/// Distinguish an explicit `null` from a missing key.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl ProductPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.inventory.is_none()
    }

    /// Check the present values against the creation rules.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] for a blank name, a non-positive
    /// price, or a negative inventory.
    pub fn validate(&self) -> Result<(), ShopError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(inventory) = self.inventory {
            validate_inventory(inventory)?;
        }
        Ok(())
    }

    /// Apply the present fields to `product`, leaving the others as they are.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(inventory) = self.inventory {
            product.inventory = inventory;
        }
    }
}

/// Key used to delete a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductKey {
    Id(ProductId),
    Name(String),
}

/// Caller input for deleting a product: an id, a name, or both.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeleteProductInput {
    pub id: Option<ProductId>,
    pub name: Option<String>,
}

impl DeleteProductInput {
    /// Pick the discriminator to delete by. The id wins when both are set;
    /// blank values count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingDeleteKey`] when neither is usable.
    pub fn into_key(self) -> Result<ProductKey, ShopError> {
        if let Some(id) = self.id.filter(|id| !id.is_blank()) {
            return Ok(ProductKey::Id(id));
        }
        if let Some(name) = self.name.filter(|name| !name.trim().is_empty()) {
            return Ok(ProductKey::Name(name));
        }
        Err(ValidationError::MissingDeleteKey.into())
    }
}

//! Product service: use-cases for the product catalogue.

use storefront_domain::error::{ShopError, StateError, ValidationError};
use storefront_domain::id::ProductId;
use storefront_domain::product::{DeleteProductInput, NewProduct, Product, ProductKey, ProductPatch};

use crate::pagination::{Page, decode_after};
use crate::ports::ProductRepository;

/// Application service for the product catalogue.
pub struct ProductService<R> {
    repo: R,
}

/// Check whether `product` may switch its availability to `available`.
fn check_availability(product: &Product, available: bool) -> Result<(), StateError> {
    if product.available == available {
        return Err(StateError::Unchanged(available));
    }
    if available && product.inventory <= 0 {
        return Err(StateError::NoInventory);
    }
    Ok(())
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Create a product. Availability starts as `inventory > 0`.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] for a blank name, a non-positive
    /// price or a negative inventory, or a storage error.
    #[tracing::instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, ShopError> {
        let product = input.into_product()?;
        let created = self.repo.create(product).await?;
        tracing::info!(product_id = %created.id, "product created");
        Ok(created)
    }

    /// List every product, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_products(&self) -> Result<Vec<Product>, ShopError> {
        self.repo.get_all().await
    }

    /// Look up a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::NotFound`] when no product has this id, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ShopError> {
        self.repo
            .get_by_id(id.clone())
            .await?
            .ok_or_else(|| ShopError::not_found("Product", id))
    }

    /// Apply a partial update and return the re-read product.
    ///
    /// All present fields are written together; an empty patch just returns
    /// the current record.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] when a present value breaks the
    /// creation rules, [`ShopError::NotFound`] when the product does not
    /// exist, or a storage error.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, ShopError> {
        patch.validate()?;
        if patch.is_empty() {
            return self.get_product(id).await;
        }
        let updated = self
            .repo
            .update(id.clone(), patch)
            .await?
            .ok_or_else(|| ShopError::not_found("Product", id))?;
        tracing::info!(product_id = %updated.id, "product updated");
        Ok(updated)
    }

    /// Delete a product by id, or by name when no id is given.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] when neither key is given,
    /// [`ShopError::NotFound`] when nothing was deleted, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, input: DeleteProductInput) -> Result<(), ShopError> {
        let key = input.into_key()?;
        let deleted = self.repo.delete(key.clone()).await?;
        if deleted == 0 {
            return Err(match key {
                ProductKey::Id(id) => ShopError::not_found("Product", id),
                ProductKey::Name(name) => ShopError::not_found("Product", name),
            });
        }
        tracing::info!(?key, deleted, "product deleted");
        Ok(())
    }

    /// Add `quantity` units to the product's inventory.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::NotFound`] when the product does not exist,
    /// [`ShopError::Validation`] when `quantity` is not positive or would
    /// overflow the inventory, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn restock_product(&self, id: ProductId, quantity: i64) -> Result<Product, ShopError> {
        if quantity <= 0 {
            self.get_product(id).await?;
            return Err(ValidationError::NonPositiveRestock.into());
        }
        let Some(restocked) = self.repo.restock(id.clone(), quantity).await? else {
            return match self.repo.get_by_id(id.clone()).await? {
                Some(_) => Err(ValidationError::InventoryOverflow.into()),
                None => Err(ShopError::not_found("Product", id)),
            };
        };
        tracing::info!(
            product_id = %restocked.id,
            inventory = restocked.inventory,
            "product restocked"
        );
        Ok(restocked)
    }

    /// Explicitly switch a product's availability.
    ///
    /// The write only lands if the row still looks the way it did when the
    /// rules were checked; otherwise the rules are checked again against the
    /// fresh row.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::NotFound`] when the product does not exist,
    /// [`ShopError::State`] when the flag already has this value or when
    /// making a product without inventory available, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn set_product_availability(
        &self,
        id: ProductId,
        available: bool,
    ) -> Result<Product, ShopError> {
        loop {
            let current = self.get_product(id.clone()).await?;
            check_availability(&current, available)?;
            if let Some(updated) = self
                .repo
                .set_available(id.clone(), current.available, available)
                .await?
            {
                tracing::info!(product_id = %updated.id, available, "product availability changed");
                return Ok(updated);
            }
            tracing::debug!(product_id = %id, "availability changed concurrently, re-checking");
        }
    }

    /// Return one page of products ordered by id.
    ///
    /// `after` is the `end_cursor` of the previous page; absent or empty
    /// starts from the beginning.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Cursor`] when `after` cannot be decoded, or a
    /// storage error.
    #[tracing::instrument(skip(self))]
    pub async fn list_products_page(
        &self,
        after: Option<&str>,
        first: u32,
    ) -> Result<Page<Product>, ShopError> {
        let after = decode_after(after)?;
        let rows = self.repo.get_page(after, u64::from(first) + 1).await?;
        Ok(Page::from_overfetch(rows, first as usize, |product| {
            &product.id
        }))
    }

    /// Total number of products.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn count_products(&self) -> Result<u64, ShopError> {
        self.repo.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;
    use std::future::Future;
    use std::sync::Mutex;
    use storefront_domain::error::CursorError;

    #[derive(Default)]
    struct InMemoryProductRepo {
        store: Mutex<BTreeMap<ProductId, Product>>,
    }

    impl ProductRepository for InMemoryProductRepo {
        fn create(&self, product: Product) -> impl Future<Output = Result<Product, ShopError>> + Send {
            let mut store = self.store.lock().unwrap();
            store.insert(product.id.clone(), product.clone());
            async { Ok(product) }
        }

        fn get_by_id(
            &self,
            id: ProductId,
        ) -> impl Future<Output = Result<Option<Product>, ShopError>> + Send {
            let store = self.store.lock().unwrap();
            let result = store.get(&id).cloned();
            async { Ok(result) }
        }

        fn get_all(&self) -> impl Future<Output = Result<Vec<Product>, ShopError>> + Send {
            let store = self.store.lock().unwrap();
            let result: Vec<Product> = store.values().cloned().collect();
            async { Ok(result) }
        }

        fn get_page(
            &self,
            after: Option<ProductId>,
            limit: u64,
        ) -> impl Future<Output = Result<Vec<Product>, ShopError>> + Send {
            let store = self.store.lock().unwrap();
            let result: Vec<Product> = store
                .values()
                .filter(|p| after.as_ref().is_none_or(|after| &p.id > after))
                .take(usize::try_from(limit).unwrap())
                .cloned()
                .collect();
            async { Ok(result) }
        }

        fn count(&self) -> impl Future<Output = Result<u64, ShopError>> + Send {
            let store = self.store.lock().unwrap();
            let result = store.len() as u64;
            async move { Ok(result) }
        }

        fn update(
            &self,
            id: ProductId,
            patch: ProductPatch,
        ) -> impl Future<Output = Result<Option<Product>, ShopError>> + Send {
            let mut store = self.store.lock().unwrap();
            let result = store.get_mut(&id).map(|product| {
                patch.apply_to(product);
                product.clone()
            });
            async { Ok(result) }
        }

        fn restock(
            &self,
            id: ProductId,
            quantity: i64,
        ) -> impl Future<Output = Result<Option<Product>, ShopError>> + Send {
            let mut store = self.store.lock().unwrap();
            let result = store.get_mut(&id).and_then(|product| {
                product.inventory = product.inventory.checked_add(quantity)?;
                Some(product.clone())
            });
            async { Ok(result) }
        }

        fn set_available(
            &self,
            id: ProductId,
            expected: bool,
            available: bool,
        ) -> impl Future<Output = Result<Option<Product>, ShopError>> + Send {
            let mut store = self.store.lock().unwrap();
            let result = store
                .get_mut(&id)
                .filter(|p| p.available == expected && (!available || p.inventory > 0))
                .map(|product| {
                    product.available = available;
                    product.clone()
                });
            async { Ok(result) }
        }

        fn delete(&self, key: ProductKey) -> impl Future<Output = Result<u64, ShopError>> + Send {
            let mut store = self.store.lock().unwrap();
            let before = store.len();
            match &key {
                ProductKey::Id(id) => {
                    store.remove(id);
                }
                ProductKey::Name(name) => store.retain(|_, p| &p.name != name),
            }
            let deleted = (before - store.len()) as u64;
            async move { Ok(deleted) }
        }
    }

    fn make_service() -> ProductService<InMemoryProductRepo> {
        ProductService::new(InMemoryProductRepo::default())
    }

    fn new_product(name: &str, inventory: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: Decimal::new(5999, 2),
            description: Some("Fancy".to_string()),
            inventory,
        }
    }

    async fn seed(svc: &ProductService<InMemoryProductRepo>, id: &str, inventory: i64) -> Product {
        let product = Product::builder()
            .id(id)
            .name(format!("Product {id}"))
            .price(Decimal::ONE)
            .inventory(inventory)
            .build()
            .unwrap();
        svc.repo.create(product).await.unwrap()
    }

    #[tokio::test]
    async fn should_create_product_with_derived_availability() {
        let svc = make_service();

        let stocked = svc.create_product(new_product("Widget", 40)).await.unwrap();
        let empty = svc.create_product(new_product("Gadget", 0)).await.unwrap();

        assert!(stocked.available);
        assert!(!empty.available);
        assert_eq!(svc.get_product(stocked.id).await.unwrap().name, "Widget");
    }

    #[tokio::test]
    async fn should_reject_invalid_product_without_persisting() {
        let svc = make_service();
        let blank = new_product("  ", 1);
        let mut free = new_product("Free", 1);
        free.price = Decimal::ZERO;
        let negative = new_product("Debt", -1);

        for input in [blank, free, negative] {
            let result = svc.create_product(input).await;
            assert!(matches!(result, Err(ShopError::Validation(_))));
        }
        assert_eq!(svc.count_products().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn should_return_not_found_when_product_missing() {
        let svc = make_service();
        let result = svc.get_product("missing".into()).await;
        assert!(matches!(result, Err(ShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_leave_other_fields_untouched_on_partial_update() {
        let svc = make_service();
        let created = svc.create_product(new_product("Widget", 40)).await.unwrap();

        let updated = svc
            .update_product(
                created.id.clone(),
                ProductPatch {
                    price: Some(Decimal::new(4999, 2)),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, Decimal::new(4999, 2));
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.inventory, created.inventory);
        assert_eq!(updated.available, created.available);
    }

    #[tokio::test]
    async fn should_clear_description_when_patch_sets_null() {
        let svc = make_service();
        let created = svc.create_product(new_product("Widget", 40)).await.unwrap();

        let updated = svc
            .update_product(
                created.id,
                ProductPatch {
                    description: Some(None),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_missing_product() {
        let svc = make_service();
        let result = svc
            .update_product(
                "missing".into(),
                ProductPatch {
                    name: Some("New".to_string()),
                    ..ProductPatch::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_return_current_record_for_empty_patch() {
        let svc = make_service();
        let created = svc.create_product(new_product("Widget", 40)).await.unwrap();

        let same = svc
            .update_product(created.id.clone(), ProductPatch::default())
            .await
            .unwrap();

        assert_eq!(same, created);
    }

    #[tokio::test]
    async fn should_reject_patch_with_blank_name() {
        let svc = make_service();
        let created = svc.create_product(new_product("Widget", 40)).await.unwrap();
        let result = svc
            .update_product(
                created.id,
                ProductPatch {
                    name: Some(String::new()),
                    ..ProductPatch::default()
                },
            )
            .await;
        assert!(matches!(
            result,
            Err(ShopError::Validation(ValidationError::EmptyName))
        ));
    }

    #[tokio::test]
    async fn should_delete_by_id_then_report_not_found_on_second_delete() {
        let svc = make_service();
        let created = svc.create_product(new_product("Widget", 40)).await.unwrap();
        let input = DeleteProductInput {
            id: Some(created.id),
            name: None,
        };

        svc.delete_product(input.clone()).await.unwrap();
        assert_eq!(svc.count_products().await.unwrap(), 0);

        let second = svc.delete_product(input).await;
        assert!(matches!(second, Err(ShopError::NotFound(_))));
        assert_eq!(svc.count_products().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn should_delete_by_name_when_no_id_given() {
        let svc = make_service();
        svc.create_product(new_product("Widget", 40)).await.unwrap();
        svc.create_product(new_product("Gadget", 1)).await.unwrap();

        svc.delete_product(DeleteProductInput {
            id: None,
            name: Some("Widget".to_string()),
        })
        .await
        .unwrap();

        let remaining = svc.list_products().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "Gadget");
    }

    #[tokio::test]
    async fn should_reject_delete_without_id_or_name() {
        let svc = make_service();
        let result = svc.delete_product(DeleteProductInput::default()).await;
        assert!(matches!(
            result,
            Err(ShopError::Validation(ValidationError::MissingDeleteKey))
        ));
    }

    #[tokio::test]
    async fn should_add_quantity_when_restocking() {
        let svc = make_service();
        let created = svc.create_product(new_product("Widget", 40)).await.unwrap();

        let restocked = svc.restock_product(created.id, 10).await.unwrap();

        assert_eq!(restocked.inventory, 50);
    }

    #[tokio::test]
    async fn should_not_change_availability_when_restocking() {
        let svc = make_service();
        let created = svc.create_product(new_product("Widget", 0)).await.unwrap();

        let restocked = svc.restock_product(created.id, 5).await.unwrap();

        assert_eq!(restocked.inventory, 5);
        assert!(!restocked.available);
    }

    #[tokio::test]
    async fn should_reject_non_positive_restock() {
        let svc = make_service();
        let created = svc.create_product(new_product("Widget", 40)).await.unwrap();

        let result = svc.restock_product(created.id.clone(), 0).await;

        assert!(matches!(
            result,
            Err(ShopError::Validation(ValidationError::NonPositiveRestock))
        ));
        assert_eq!(svc.get_product(created.id).await.unwrap().inventory, 40);
    }

    #[tokio::test]
    async fn should_report_not_found_before_bad_restock_amount() {
        let svc = make_service();
        let result = svc.restock_product("missing".into(), -3).await;
        assert!(matches!(result, Err(ShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_reject_restock_when_inventory_would_overflow() {
        let svc = make_service();
        seed(&svc, "p1", i64::MAX - 1).await;

        let result = svc.restock_product("p1".into(), 5).await;

        assert!(matches!(
            result,
            Err(ShopError::Validation(ValidationError::InventoryOverflow))
        ));
        let unchanged = svc.get_product("p1".into()).await.unwrap();
        assert_eq!(unchanged.inventory, i64::MAX - 1);
    }

    #[tokio::test]
    async fn should_restock_up_to_inventory_limit() {
        let svc = make_service();
        let created = svc.create_product(new_product("Widget", 40)).await.unwrap();
        svc.update_product(
            created.id.clone(),
            ProductPatch {
                inventory: Some(i64::MAX - 5),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap();

        let full = svc.restock_product(created.id.clone(), 5).await.unwrap();
        let over = svc.restock_product(created.id.clone(), 1).await;

        assert_eq!(full.inventory, i64::MAX);
        assert!(matches!(
            over,
            Err(ShopError::Validation(ValidationError::InventoryOverflow))
        ));
        assert_eq!(svc.list_products().await.unwrap()[0].inventory, i64::MAX);
    }

    #[tokio::test]
    async fn should_return_not_found_when_restocking_missing_product() {
        let svc = make_service();
        let result = svc.restock_product("missing".into(), 5).await;
        assert!(matches!(result, Err(ShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_reject_availability_noop() {
        let svc = make_service();
        let created = svc.create_product(new_product("Widget", 40)).await.unwrap();

        let result = svc.set_product_availability(created.id, true).await;

        assert!(matches!(
            result,
            Err(ShopError::State(StateError::Unchanged(true)))
        ));
    }

    #[tokio::test]
    async fn should_reject_making_available_without_inventory() {
        let svc = make_service();
        let created = svc.create_product(new_product("Widget", 0)).await.unwrap();

        let result = svc.set_product_availability(created.id, true).await;

        assert!(matches!(
            result,
            Err(ShopError::State(StateError::NoInventory))
        ));
    }

    #[tokio::test]
    async fn should_toggle_availability_when_allowed() {
        let svc = make_service();
        let created = svc.create_product(new_product("Widget", 40)).await.unwrap();

        let off = svc
            .set_product_availability(created.id.clone(), false)
            .await
            .unwrap();
        let on = svc.set_product_availability(created.id, true).await.unwrap();

        assert!(!off.available);
        assert!(on.available);
    }

    #[tokio::test]
    async fn should_return_not_found_when_setting_availability_of_missing_product() {
        let svc = make_service();
        let result = svc.set_product_availability("missing".into(), true).await;
        assert!(matches!(result, Err(ShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_page_through_products_in_id_order() {
        let svc = make_service();
        for id in ["p3", "p1", "p5", "p2", "p4"] {
            seed(&svc, id, 1).await;
        }

        let first = svc.list_products_page(None, 2).await.unwrap();
        let ids: Vec<&str> = first.items.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert!(first.has_next_page);

        let second = svc
            .list_products_page(first.end_cursor.as_deref(), 2)
            .await
            .unwrap();
        let ids: Vec<&str> = second.items.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p4"]);
        assert!(second.has_next_page);

        let last = svc
            .list_products_page(second.end_cursor.as_deref(), 2)
            .await
            .unwrap();
        let ids: Vec<&str> = last.items.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p5"]);
        assert!(!last.has_next_page);
    }

    #[tokio::test]
    async fn should_not_flag_next_page_when_exactly_first_rows_remain() {
        let svc = make_service();
        seed(&svc, "p1", 1).await;
        seed(&svc, "p2", 1).await;

        let page = svc.list_products_page(Some(""), 2).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert!(!page.has_next_page);
    }

    #[tokio::test]
    async fn should_reject_undecodable_cursor() {
        let svc = make_service();
        let result = svc.list_products_page(Some("%%%"), 2).await;
        assert!(matches!(
            result,
            Err(ShopError::Cursor(CursorError::Encoding))
        ));
    }

    #[tokio::test]
    async fn should_count_all_products() {
        let svc = make_service();
        seed(&svc, "p1", 0).await;
        seed(&svc, "p2", 3).await;
        assert_eq!(svc.count_products().await.unwrap(), 2);
    }
}

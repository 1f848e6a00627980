//! `SQLite` implementation of [`ProductRepository`].

use std::future::Future;
use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use storefront_app::ports::ProductRepository;
use storefront_domain::error::ShopError;
use storefront_domain::id::ProductId;
use storefront_domain::product::{Product, ProductKey, ProductPatch};

use crate::error::{StorageError, decode};

/// Wrapper for converting database rows into domain [`Product`].
struct Wrapper(Product);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Product> {
        value.map(|w| w.0)
    }

    fn many(values: Vec<Self>) -> Vec<Product> {
        values.into_iter().map(|w| w.0).collect()
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let price: String = row.try_get("price")?;

        Ok(Self(Product {
            id: ProductId::from(id),
            name: row.try_get("name")?,
            price: Decimal::from_str(&price).map_err(decode)?,
            description: row.try_get("description")?,
            inventory: row.try_get("inventory")?,
            available: row.try_get("available")?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO products (id, name, price, description, inventory, available)
    VALUES (?, ?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM products WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM products ORDER BY id";
const SELECT_PAGE: &str = "SELECT * FROM products ORDER BY id LIMIT ?";
const SELECT_PAGE_AFTER: &str = "SELECT * FROM products WHERE id > ? ORDER BY id LIMIT ?";
const COUNT: &str = "SELECT COUNT(*) FROM products";
const PATCH: &str = r"
    UPDATE products SET
        name = COALESCE(?, name),
        price = COALESCE(?, price),
        description = CASE WHEN ? THEN ? ELSE description END,
        inventory = COALESCE(?, inventory)
    WHERE id = ?
    RETURNING *
";
// SQLite silently promotes an overflowing integer sum to REAL, so the sum is
// bounded in the WHERE clause instead. `quantity` is always positive here.
const RESTOCK: &str = r"
    UPDATE products SET inventory = inventory + ?
    WHERE id = ? AND inventory <= 9223372036854775807 - ?
    RETURNING *
";
const SET_AVAILABLE: &str = r"
    UPDATE products SET available = ?
    WHERE id = ? AND available = ? AND (? = 0 OR inventory > 0)
    RETURNING *
";
const DELETE_BY_ID: &str = "DELETE FROM products WHERE id = ?";
const DELETE_BY_NAME: &str = "DELETE FROM products WHERE name = ?";

/// `SQLite`-backed product repository.
pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for SqliteProductRepository {
    fn create(&self, product: Product) -> impl Future<Output = Result<Product, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(product.id.as_str())
                .bind(&product.name)
                .bind(product.price.to_string())
                .bind(product.description.as_deref())
                .bind(product.inventory)
                .bind(product.available)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(product)
        }
    }

    fn get_by_id(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Product>, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::many(rows))
        }
    }

    fn get_page(
        &self,
        after: Option<ProductId>,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<Product>, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let limit = i64::try_from(limit).unwrap_or(i64::MAX);
            let rows: Vec<Wrapper> = if let Some(after) = after {
                sqlx::query_as(SELECT_PAGE_AFTER)
                    .bind(after.into_inner())
                    .bind(limit)
                    .fetch_all(&pool)
                    .await
                    .map_err(StorageError::from)?
            } else {
                sqlx::query_as(SELECT_PAGE)
                    .bind(limit)
                    .fetch_all(&pool)
                    .await
                    .map_err(StorageError::from)?
            };

            Ok(Wrapper::many(rows))
        }
    }

    fn count(&self) -> impl Future<Output = Result<u64, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let count: i64 = sqlx::query_scalar(COUNT)
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(u64::try_from(count).unwrap_or_default())
        }
    }

    fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> impl Future<Output = Result<Option<Product>, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let touch_description = patch.description.is_some();
            let row: Option<Wrapper> = sqlx::query_as(PATCH)
                .bind(patch.name)
                .bind(patch.price.map(|price| price.to_string()))
                .bind(touch_description)
                .bind(patch.description.flatten())
                .bind(patch.inventory)
                .bind(id.into_inner())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn restock(
        &self,
        id: ProductId,
        quantity: i64,
    ) -> impl Future<Output = Result<Option<Product>, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(RESTOCK)
                .bind(quantity)
                .bind(id.into_inner())
                .bind(quantity)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn set_available(
        &self,
        id: ProductId,
        expected: bool,
        available: bool,
    ) -> impl Future<Output = Result<Option<Product>, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SET_AVAILABLE)
                .bind(available)
                .bind(id.into_inner())
                .bind(expected)
                .bind(available)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn delete(&self, key: ProductKey) -> impl Future<Output = Result<u64, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let query = match key {
                ProductKey::Id(id) => sqlx::query(DELETE_BY_ID).bind(id.into_inner()),
                ProductKey::Name(name) => sqlx::query(DELETE_BY_NAME).bind(name),
            };
            let result = query.execute(&pool).await.map_err(StorageError::from)?;

            Ok(result.rows_affected())
        }
    }
}

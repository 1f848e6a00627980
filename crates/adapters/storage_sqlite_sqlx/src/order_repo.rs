//! `SQLite` implementation of [`OrderRepository`].
//!
//! Product associations live in `order_products` and are loaded with a
//! `LEFT JOIN` on `products`, so an association whose product row is gone
//! still comes back, just without a name.

use std::collections::HashMap;
use std::future::Future;
use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection, SqlitePool};

use storefront_app::ports::OrderRepository;
use storefront_domain::error::ShopError;
use storefront_domain::id::{OrderId, ProductId, UserId};
use storefront_domain::order::{Order, OrderPatch, OrderProduct};
use storefront_domain::time;

use crate::error::{StorageError, decode};

/// Wrapper for converting database rows into domain [`Order`] (without
/// its products).
struct Wrapper(Order);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let user_id: String = row.try_get("user_id")?;
        let total_price: String = row.try_get("total_price")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(Order {
            id: OrderId::from(id),
            user_id: UserId::from(user_id),
            products: Vec::new(),
            quantity: row.try_get("quantity")?,
            total_price: Decimal::from_str(&total_price).map_err(decode)?,
            status: row.try_get("status")?,
            created_at: time::from_storage(&created_at).map_err(decode)?,
        }))
    }
}

/// One `order_products` row joined with the product name.
struct Line {
    order_id: String,
    product: OrderProduct,
}

impl<'r> FromRow<'r, SqliteRow> for Line {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let product_id: String = row.try_get("product_id")?;
        Ok(Self {
            order_id: row.try_get("order_id")?,
            product: OrderProduct {
                id: ProductId::from(product_id),
                name: row.try_get("product_name")?,
            },
        })
    }
}

/// Attach loaded lines to their orders, keeping the order of both.
fn assemble(orders: Vec<Wrapper>, lines: Vec<Line>) -> Vec<Order> {
    let mut by_order: HashMap<String, Vec<OrderProduct>> = HashMap::new();
    for line in lines {
        by_order.entry(line.order_id).or_default().push(line.product);
    }
    orders
        .into_iter()
        .map(|Wrapper(mut order)| {
            order.products = by_order.remove(order.id.as_str()).unwrap_or_default();
            order
        })
        .collect()
}

const INSERT: &str = r"
    INSERT INTO orders (id, user_id, quantity, total_price, status, created_at)
    VALUES (?, ?, ?, ?, ?, ?)
";
const INSERT_LINE: &str =
    "INSERT INTO order_products (order_id, product_id, position) VALUES (?, ?, ?)";

const SELECT_BY_ID: &str = "SELECT * FROM orders WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM orders ORDER BY created_at, id";
const SELECT_BY_USER: &str = "SELECT * FROM orders WHERE user_id = ? ORDER BY created_at, id";

const SELECT_LINES_BY_ORDER: &str = r"
    SELECT op.order_id, op.product_id, p.name AS product_name
    FROM order_products op
    LEFT JOIN products p ON p.id = op.product_id
    WHERE op.order_id = ?
    ORDER BY op.position
";
const SELECT_LINES_ALL: &str = r"
    SELECT op.order_id, op.product_id, p.name AS product_name
    FROM order_products op
    LEFT JOIN products p ON p.id = op.product_id
    ORDER BY op.order_id, op.position
";
const SELECT_LINES_BY_USER: &str = r"
    SELECT op.order_id, op.product_id, p.name AS product_name
    FROM order_products op
    JOIN orders o ON o.id = op.order_id
    LEFT JOIN products p ON p.id = op.product_id
    WHERE o.user_id = ?
    ORDER BY op.order_id, op.position
";

const PATCH: &str = r"
    UPDATE orders SET
        quantity = COALESCE(?, quantity),
        total_price = COALESCE(?, total_price),
        status = COALESCE(?, status)
    WHERE id = ?
";
const DELETE: &str = "DELETE FROM orders WHERE id = ? AND user_id = ?";
const COUNT: &str = "SELECT COUNT(*) FROM orders";

async fn load_one(conn: &mut SqliteConnection, id: &str) -> Result<Option<Order>, sqlx::Error> {
    let Some(order) = sqlx::query_as::<_, Wrapper>(SELECT_BY_ID)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };
    let lines: Vec<Line> = sqlx::query_as(SELECT_LINES_BY_ORDER)
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(assemble(vec![order], lines).pop())
}

/// `SQLite`-backed order repository.
pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for SqliteOrderRepository {
    fn create(&self, order: Order) -> impl Future<Output = Result<Order, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;

            sqlx::query(INSERT)
                .bind(order.id.as_str())
                .bind(order.user_id.as_str())
                .bind(order.quantity)
                .bind(order.total_price.to_string())
                .bind(order.status.as_str())
                .bind(time::to_storage(&order.created_at))
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;

            for (position, product_id) in (0_i64..).zip(order.product_ids()) {
                sqlx::query(INSERT_LINE)
                    .bind(order.id.as_str())
                    .bind(product_id.as_str())
                    .bind(position)
                    .execute(&mut *tx)
                    .await
                    .map_err(StorageError::from)?;
            }

            let stored = load_one(&mut *tx, order.id.as_str())
                .await
                .map_err(StorageError::from)?
                .ok_or_else(|| ShopError::not_found("Order", order.id.clone()))?;
            tx.commit().await.map_err(StorageError::from)?;

            Ok(stored)
        }
    }

    fn get_by_id(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut conn = pool.acquire().await.map_err(StorageError::from)?;
            let order = load_one(&mut *conn, id.as_str())
                .await
                .map_err(StorageError::from)?;
            Ok(order)
        }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Order>, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            let orders: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            let lines: Vec<Line> = sqlx::query_as(SELECT_LINES_ALL)
                .fetch_all(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            tx.commit().await.map_err(StorageError::from)?;

            Ok(assemble(orders, lines))
        }
    }

    fn find_by_user_id(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Order>, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            let orders: Vec<Wrapper> = sqlx::query_as(SELECT_BY_USER)
                .bind(user_id.as_str())
                .fetch_all(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            let lines: Vec<Line> = sqlx::query_as(SELECT_LINES_BY_USER)
                .bind(user_id.as_str())
                .fetch_all(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            tx.commit().await.map_err(StorageError::from)?;

            Ok(assemble(orders, lines))
        }
    }

    fn update(
        &self,
        id: OrderId,
        patch: OrderPatch,
    ) -> impl Future<Output = Result<Option<Order>, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let mut tx = pool.begin().await.map_err(StorageError::from)?;
            let result = sqlx::query(PATCH)
                .bind(patch.quantity)
                .bind(patch.total_price.map(|price| price.to_string()))
                .bind(patch.status)
                .bind(id.as_str())
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
            if result.rows_affected() == 0 {
                return Ok(None);
            }

            let order = load_one(&mut *tx, id.as_str())
                .await
                .map_err(StorageError::from)?;
            tx.commit().await.map_err(StorageError::from)?;

            Ok(order)
        }
    }

    fn delete(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> impl Future<Output = Result<u64, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE)
                .bind(id.as_str())
                .bind(user_id.as_str())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected())
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
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::pool::Config;
    use crate::product_repo::SqliteProductRepository;
    use storefront_app::ports::ProductRepository;
    use storefront_domain::product::Product;

    async fn setup() -> (SqliteOrderRepository, SqliteProductRepository, SqlitePool) {
        let db = Config::in_memory().build().await.unwrap();
        let pool = db.pool().clone();
        (
            SqliteOrderRepository::new(pool.clone()),
            SqliteProductRepository::new(pool.clone()),
            pool,
        )
    }

    fn order(user_id: &str, product_ids: &[&str]) -> Order {
        Order {
            id: OrderId::generate(),
            user_id: UserId::from(user_id),
            products: product_ids
                .iter()
                .copied()
                .map(|id| OrderProduct::unresolved(ProductId::from(id)))
                .collect(),
            quantity: 1,
            total_price: Decimal::new(5999, 2),
            status: "pending".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    async fn line_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM order_products")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn should_eager_load_product_names_for_user_orders() {
        let (orders, products, _) = setup().await;
        for (id, name, inventory) in [("p1", "Widget", 40), ("p2", "Gadget", 51)] {
            let product = Product::builder()
                .id(id)
                .name(name)
                .price(Decimal::new(5999, 2))
                .inventory(inventory)
                .build()
                .unwrap();
            products.create(product).await.unwrap();
        }
        orders.create(order("1", &["p1"])).await.unwrap();

        let found = orders.find_by_user_id("1".into()).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].products.len(), 1);
        assert_eq!(found[0].products[0].name.as_deref(), Some("Widget"));
    }

    #[tokio::test]
    async fn should_keep_association_without_name_when_product_unknown() {
        let (orders, _, _) = setup().await;

        let created = orders.create(order("1", &["ghost"])).await.unwrap();

        assert_eq!(
            created.products,
            vec![OrderProduct::unresolved("ghost".into())]
        );
    }

    #[tokio::test]
    async fn should_roundtrip_price_and_timestamp_exactly() {
        let (orders, _, _) = setup().await;
        let mut input = order("1", &["p1"]);
        input.total_price = Decimal::new(123_456_789, 4);
        input.created_at += Duration::microseconds(42);

        let created = orders.create(input.clone()).await.unwrap();
        let fetched = orders.get_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(fetched.total_price, input.total_price);
        assert_eq!(fetched.created_at, input.created_at);
    }

    #[tokio::test]
    async fn should_keep_product_order_of_input() {
        let (orders, _, _) = setup().await;

        let created = orders.create(order("1", &["p9", "p1", "p5"])).await.unwrap();

        let ids: Vec<&str> = created.product_ids().map(ProductId::as_str).collect();
        assert_eq!(ids, vec!["p9", "p1", "p5"]);
    }

    #[tokio::test]
    async fn should_isolate_orders_between_users_in_creation_order() {
        let (orders, _, _) = setup().await;
        let mut early = order("alice", &["p1"]);
        early.created_at -= Duration::hours(1);
        let late = orders.create(order("alice", &["p2"])).await.unwrap();
        let early = orders.create(early).await.unwrap();
        orders.create(order("bob", &["p1", "p2"])).await.unwrap();

        let alice = orders.find_by_user_id("alice".into()).await.unwrap();
        let bob = orders.find_by_user_id("bob".into()).await.unwrap();
        let carol = orders.find_by_user_id("carol".into()).await.unwrap();

        let alice_ids: Vec<&OrderId> = alice.iter().map(|o| &o.id).collect();
        assert_eq!(alice_ids, vec![&early.id, &late.id]);
        assert_eq!(bob.len(), 1);
        assert_eq!(bob[0].products.len(), 2);
        assert!(carol.is_empty());
        assert_eq!(orders.get_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn should_not_persist_anything_when_association_insert_fails() {
        let (orders, _, pool) = setup().await;
        let mut input = order("1", &["p1"]);
        // A repeated product id breaks the association primary key.
        input.products.push(OrderProduct::unresolved("p1".into()));

        let result = orders.create(input).await;

        assert!(matches!(result, Err(ShopError::Storage(_))));
        assert_eq!(orders.count().await.unwrap(), 0);
        assert_eq!(line_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn should_patch_present_fields_and_keep_products() {
        let (orders, _, _) = setup().await;
        let created = orders.create(order("1", &["p1", "p2"])).await.unwrap();

        let updated = orders
            .update(
                created.id.clone(),
                OrderPatch {
                    status: Some("shipped".to_string()),
                    total_price: Some(Decimal::new(1000, 2)),
                    ..OrderPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, "shipped");
        assert_eq!(updated.total_price, Decimal::new(1000, 2));
        assert_eq!(updated.quantity, created.quantity);
        assert_eq!(updated.products, created.products);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn should_return_none_when_patching_missing_order() {
        let (orders, _, _) = setup().await;
        let result = orders
            .update(
                "missing".into(),
                OrderPatch {
                    quantity: Some(3),
                    ..OrderPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn should_delete_order_with_associations_only_for_owner() {
        let (orders, _, pool) = setup().await;
        let created = orders.create(order("1", &["p1", "p2"])).await.unwrap();

        let wrong_owner = orders.delete(created.id.clone(), "2".into()).await.unwrap();
        let deleted = orders.delete(created.id.clone(), "1".into()).await.unwrap();
        let again = orders.delete(created.id.clone(), "1".into()).await.unwrap();

        assert_eq!((wrong_owner, deleted, again), (0, 1, 0));
        assert!(orders.get_by_id(created.id).await.unwrap().is_none());
        assert_eq!(line_count(&pool).await, 0);
    }
}

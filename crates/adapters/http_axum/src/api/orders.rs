//! JSON handlers for orders.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use storefront_app::ports::OrderRepository;
use storefront_app::services::order_service::OrderService;
use storefront_domain::error::{ShopError, ValidationError};
use storefront_domain::id::{OrderId, UserId};
use storefront_domain::order::{NewOrder, OrderPatch};

use super::{Created, NoContent};
use crate::error::ApiError;

type OrderState<R> = State<Arc<OrderService<R>>>;

/// Build the order sub-router, including `/users/{id}/orders`.
pub fn routes<R>(service: Arc<OrderService<R>>) -> Router
where
    R: OrderRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/orders", get(list::<R>).post(create::<R>))
        .route(
            "/orders/{id}",
            get(get_one::<R>).patch(update::<R>).delete(delete::<R>),
        )
        .route("/users/{id}/orders", get(list_for_user::<R>))
        .with_state(service)
}

/// Query string of the delete endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub user_id: Option<UserId>,
}

/// `GET /api/orders`
pub async fn list<R>(State(service): OrderState<R>) -> Result<impl IntoResponse, ApiError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let orders = service.list_orders().await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}`
pub async fn get_one<R>(
    State(service): OrderState<R>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let order = service.get_order(OrderId::from(id)).await?;
    Ok(Json(order))
}

/// `GET /api/users/{id}/orders`
pub async fn list_for_user<R>(
    State(service): OrderState<R>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let orders = service.orders_for_user(UserId::from(user_id)).await?;
    Ok(Json(orders))
}

/// `POST /api/orders`
pub async fn create<R>(
    State(service): OrderState<R>,
    Json(input): Json<NewOrder>,
) -> Result<impl IntoResponse, ApiError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let created = service.create_order(input).await?;
    Ok(Created(created))
}

/// `PATCH /api/orders/{id}`
pub async fn update<R>(
    State(service): OrderState<R>,
    Path(id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let updated = service.update_order(OrderId::from(id), patch).await?;
    Ok(Json(updated))
}

/// `DELETE /api/orders/{id}?user_id=…`
pub async fn delete<R>(
    State(service): OrderState<R>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<NoContent, ApiError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let user_id = query
        .user_id
        .filter(|user_id| !user_id.is_blank())
        .ok_or_else(|| ShopError::from(ValidationError::EmptyUserId))?;
    service.delete_order(OrderId::from(id), user_id).await?;
    Ok(NoContent)
}

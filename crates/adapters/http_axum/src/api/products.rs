//! JSON handlers for the product catalogue.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use storefront_app::pagination::Page;
use storefront_app::ports::ProductRepository;
use storefront_app::services::product_service::ProductService;
use storefront_domain::id::ProductId;
use storefront_domain::product::{DeleteProductInput, NewProduct, Product, ProductPatch};

use super::{Created, NoContent};
use crate::error::ApiError;

/// Page size used when a cursor is given without `first`.
const DEFAULT_PAGE_SIZE: u32 = 20;

type ProductState<R> = State<Arc<ProductService<R>>>;

/// Build the product sub-router.
pub fn routes<R>(service: Arc<ProductService<R>>) -> Router
where
    R: ProductRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/products",
            get(list::<R>).post(create::<R>).delete(delete_by_query::<R>),
        )
        .route("/products/count", get(count::<R>))
        .route(
            "/products/{id}",
            get(get_one::<R>).patch(update::<R>).delete(delete::<R>),
        )
        .route("/products/{id}/restock", post(restock::<R>))
        .route("/products/{id}/availability", put(set_availability::<R>))
        .with_state(service)
}

/// Query string of the list endpoint. Either parameter switches to a
/// cursor page.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub first: Option<u32>,
    /// `end_cursor` of the previous page. Cursors are standard base64 and may
    /// contain `+`, `/` and `=`, so clients must percent-encode them. An
    /// unescaped `+` arrives as a space and the cursor is rejected.
    pub after: Option<String>,
}

/// Body of the restock endpoint.
#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
}

/// Body of the availability endpoint.
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

#[derive(Serialize)]
struct CountBody {
    count: u64,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    All(Json<Vec<Product>>),
    Page(Json<Page<Product>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::All(json) => json.into_response(),
            Self::Page(json) => json.into_response(),
        }
    }
}

/// `GET /api/products`
pub async fn list<R>(
    State(service): ProductState<R>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    R: ProductRepository + Send + Sync + 'static,
{
    if query.first.is_none() && query.after.is_none() {
        let products = service.list_products().await?;
        return Ok(ListResponse::All(Json(products)));
    }
    let page = service
        .list_products_page(
            query.after.as_deref(),
            query.first.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;
    Ok(ListResponse::Page(Json(page)))
}

/// `GET /api/products/count`
pub async fn count<R>(State(service): ProductState<R>) -> Result<impl IntoResponse, ApiError>
where
    R: ProductRepository + Send + Sync + 'static,
{
    let count = service.count_products().await?;
    Ok(Json(CountBody { count }))
}

/// `GET /api/products/{id}`
pub async fn get_one<R>(
    State(service): ProductState<R>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: ProductRepository + Send + Sync + 'static,
{
    let product = service.get_product(ProductId::from(id)).await?;
    Ok(Json(product))
}

/// `POST /api/products`
pub async fn create<R>(
    State(service): ProductState<R>,
    Json(input): Json<NewProduct>,
) -> Result<impl IntoResponse, ApiError>
where
    R: ProductRepository + Send + Sync + 'static,
{
    let created = service.create_product(input).await?;
    Ok(Created(created))
}

/// `PATCH /api/products/{id}`
pub async fn update<R>(
    State(service): ProductState<R>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    R: ProductRepository + Send + Sync + 'static,
{
    let updated = service.update_product(ProductId::from(id), patch).await?;
    Ok(Json(updated))
}

/// `DELETE /api/products/{id}`
pub async fn delete<R>(
    State(service): ProductState<R>,
    Path(id): Path<String>,
) -> Result<NoContent, ApiError>
where
    R: ProductRepository + Send + Sync + 'static,
{
    service
        .delete_product(DeleteProductInput {
            id: Some(ProductId::from(id)),
            name: None,
        })
        .await?;
    Ok(NoContent)
}

/// `DELETE /api/products?id=…&name=…`
pub async fn delete_by_query<R>(
    State(service): ProductState<R>,
    Query(input): Query<DeleteProductInput>,
) -> Result<NoContent, ApiError>
where
    R: ProductRepository + Send + Sync + 'static,
{
    service.delete_product(input).await?;
    Ok(NoContent)
}

/// `POST /api/products/{id}/restock`
pub async fn restock<R>(
    State(service): ProductState<R>,
    Path(id): Path<String>,
    Json(req): Json<RestockRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: ProductRepository + Send + Sync + 'static,
{
    let product = service
        .restock_product(ProductId::from(id), req.quantity)
        .await?;
    Ok(Json(product))
}

/// `PUT /api/products/{id}/availability`
pub async fn set_availability<R>(
    State(service): ProductState<R>,
    Path(id): Path<String>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: ProductRepository + Send + Sync + 'static,
{
    let product = service
        .set_product_availability(ProductId::from(id), req.available)
        .await?;
    Ok(Json(product))
}

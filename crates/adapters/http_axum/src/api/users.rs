//! JSON handlers for user accounts.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use storefront_app::ports::UserRepository;
use storefront_app::services::user_service::UserService;
use storefront_domain::id::UserId;
use storefront_domain::user::{NewUser, UserPatch};

use super::{Created, NoContent};
use crate::error::ApiError;

type UserState<R> = State<Arc<UserService<R>>>;

/// Build the user sub-router.
pub fn routes<R>(service: Arc<UserService<R>>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/users", get(list::<R>).post(create::<R>))
        .route(
            "/users/{id}",
            get(get_one::<R>).patch(update::<R>).delete(delete::<R>),
        )
        .with_state(service)
}

/// `GET /api/users`
pub async fn list<R>(State(service): UserState<R>) -> Result<impl IntoResponse, ApiError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let users = service.list_users().await?;
    Ok(Json(users))
}

/// `GET /api/users/{id}`
pub async fn get_one<R>(
    State(service): UserState<R>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let user = service.get_user(UserId::from(id)).await?;
    Ok(Json(user))
}

/// `POST /api/users`
pub async fn create<R>(
    State(service): UserState<R>,
    Json(input): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let created = service.create_user(input).await?;
    Ok(Created(created))
}

/// `PATCH /api/users/{id}`
pub async fn update<R>(
    State(service): UserState<R>,
    Path(id): Path<String>,
    Json(patch): Json<UserPatch>,
) -> Result<impl IntoResponse, ApiError>
where
    R: UserRepository + Send + Sync + 'static,
{
    let updated = service.update_user(UserId::from(id), patch).await?;
    Ok(Json(updated))
}

/// `DELETE /api/users/{id}`
pub async fn delete<R>(
    State(service): UserState<R>,
    Path(id): Path<String>,
) -> Result<NoContent, ApiError>
where
    R: UserRepository + Send + Sync + 'static,
{
    service.delete_user(UserId::from(id)).await?;
    Ok(NoContent)
}

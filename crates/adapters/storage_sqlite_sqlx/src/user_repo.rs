//! `SQLite` implementation of [`UserRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use storefront_app::ports::UserRepository;
use storefront_domain::error::ShopError;
use storefront_domain::id::UserId;
use storefront_domain::user::{Role, User, UserPatch};

use crate::error::{StorageError, decode};

struct Wrapper(User);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<User> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let role: String = row.try_get("role")?;

        Ok(Self(User {
            id: UserId::from(id),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: role.parse::<Role>().map_err(decode)?,
            active: row.try_get("active")?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO users (id, name, email, password_hash, role, active)
    VALUES (?, ?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM users WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM users ORDER BY id";
const PATCH: &str = r"
    UPDATE users SET
        name = COALESCE(?, name),
        email = COALESCE(?, email),
        role = COALESCE(?, role),
        active = COALESCE(?, active)
    WHERE id = ?
    RETURNING *
";
const DELETE_BY_ID: &str = "DELETE FROM users WHERE id = ?";
const COUNT: &str = "SELECT COUNT(*) FROM users";

/// `SQLite`-backed user repository.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    fn create(&self, user: User) -> impl Future<Output = Result<User, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(user.id.as_str())
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.role.as_str())
                .bind(user.active)
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(user)
        }
    }

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, ShopError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<User>, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(
        &self,
        id: UserId,
        patch: UserPatch,
    ) -> impl Future<Output = Result<Option<User>, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(PATCH)
                .bind(patch.name)
                .bind(patch.email)
                .bind(patch.role.map(Role::as_str))
                .bind(patch.active)
                .bind(id.as_str())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn delete(&self, id: UserId) -> impl Future<Output = Result<u64, ShopError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.as_str())
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

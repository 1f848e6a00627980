//! User service: use-cases for user accounts.

use storefront_domain::error::ShopError;
use storefront_domain::id::UserId;
use storefront_domain::user::{NewUser, User, UserPatch};

use crate::ports::UserRepository;

/// Application service for user CRUD operations.
pub struct UserService<R> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Register a user. The password is hashed before it reaches storage.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] for a blank name or email or an
    /// empty password, [`ShopError::Credential`] when hashing fails, or a
    /// storage error.
    #[tracing::instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: NewUser) -> Result<User, ShopError> {
        if !input.active {
            tracing::debug!("ignoring inactive flag on new user, accounts start active");
        }
        let user = input.into_user()?;
        let created = self.repo.create(user).await?;
        tracing::info!(user_id = %created.id, role = %created.role, "user created");
        Ok(created)
    }

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::NotFound`] when no user has this id, or a storage
    /// error.
    #[tracing::instrument(skip(self))]
    pub async fn get_user(&self, id: UserId) -> Result<User, ShopError> {
        self.repo
            .get_by_id(id.clone())
            .await?
            .ok_or_else(|| ShopError::not_found("User", id))
    }

    /// List every user.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_users(&self) -> Result<Vec<User>, ShopError> {
        self.repo.get_all().await
    }

    /// Update name, email, role or active flag.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] for a blank name or email,
    /// [`ShopError::NotFound`] when the user does not exist, or a storage
    /// error.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, ShopError> {
        patch.validate()?;
        if patch.is_empty() {
            return self.get_user(id).await;
        }
        let updated = self
            .repo
            .update(id.clone(), patch)
            .await?
            .ok_or_else(|| ShopError::not_found("User", id))?;
        tracing::info!(user_id = %updated.id, "user updated");
        Ok(updated)
    }

    /// Delete a user. Their orders are left in place.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::NotFound`] when no user has this id, or a storage
    /// error.
    #[tracing::instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ShopError> {
        if self.repo.delete(id.clone()).await? == 0 {
            return Err(ShopError::not_found("User", id));
        }
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Total number of users.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn count_users(&self) -> Result<u64, ShopError> {
        self.repo.count().await
    }
}

//! User: an account that places orders.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use serde::{Deserialize, Serialize};

use crate::error::{CredentialError, ShopError, ValidationError};
use crate::id::UserId;

/// Account role. Recorded but not enforced anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    Customer,
}

impl Role {
    /// Stored representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Customer => "CUSTOMER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role {0:?}")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "CUSTOMER" => Ok(Self::Customer),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A user account.
///
/// The password is only ever held as an argon2 PHC string and is never
/// serialized.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl User {
    /// Check a candidate password against the stored hash.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Credential`] when the stored hash cannot be
    /// parsed or verification fails for a reason other than a mismatch.
    pub fn verify_password(&self, candidate: &str) -> Result<bool, ShopError> {
        let parsed = PasswordHash::new(&self.password_hash).map_err(CredentialError)?;
        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialError(err).into()),
        }
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, ShopError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword.into());
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(CredentialError)?;
    Ok(hash.to_string())
}

fn default_active() -> bool {
    true
}

/// Input for registering a user.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    /// Validate the input, hash the password and build a fresh [`User`].
    ///
    /// New accounts always start active; the `active` flag of the input is
    /// not honoured.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] when the name or email is blank or
    /// the password is empty, and [`ShopError::Credential`] when hashing
    /// fails.
    pub fn into_user(self) -> Result<User, ShopError> {
        validate_name(&self.name)?;
        validate_email(&self.email)?;
        let password_hash = hash_password(&self.password)?;
        Ok(User {
            id: UserId::generate(),
            name: self.name,
            email: self.email,
            password_hash,
            role: self.role,
            active: true,
        })
    }
}

/// Field update set for a user. The id is carried separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

impl UserPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none() && self.active.is_none()
    }

    /// Check the present values.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Validation`] for a blank name or email.
    pub fn validate(&self) -> Result<(), ShopError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    /// Apply the present fields to `user`, leaving the others as they are.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            user.email.clone_from(email);
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(active) = self.active {
            user.active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            name: "Tina Test".to_string(),
            email: "tinatest@test.com".to_string(),
            password: "hunter2".to_string(),
            role: Role::Customer,
            active: false,
        }
    }

    #[test]
    fn should_hash_password_and_force_active() {
        let user = new_user().into_user().unwrap();
        assert!(user.active);
        assert_ne!(user.password_hash, "hunter2");
        assert!(user.password_hash.starts_with("$argon2"));
        assert!(user.verify_password("hunter2").unwrap());
        assert!(!user.verify_password("hunter3").unwrap());
    }

    #[test]
    fn should_reject_empty_password() {
        let mut input = new_user();
        input.password = String::new();
        assert!(matches!(
            input.into_user(),
            Err(ShopError::Validation(ValidationError::EmptyPassword))
        ));
    }

    #[test]
    fn should_reject_blank_email() {
        let mut input = new_user();
        input.email = " ".to_string();
        assert!(matches!(
            input.into_user(),
            Err(ShopError::Validation(ValidationError::EmptyEmail))
        ));
    }

    #[test]
    fn should_never_serialize_password_hash() {
        let user = new_user().into_user().unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "CUSTOMER");
    }

    #[test]
    fn should_keep_password_out_of_debug_output() {
        let input = new_user();
        assert!(!format!("{input:?}").contains("hunter2"));
    }

    #[test]
    fn should_default_role_to_customer_and_active_to_true() {
        let input: NewUser =
            serde_json::from_str(r#"{"name":"A","email":"a@b.c","password":"x"}"#).unwrap();
        assert_eq!(input.role, Role::Customer);
        assert!(input.active);
    }

    #[test]
    fn should_parse_role_from_stored_text() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn should_only_touch_present_fields_when_applying_patch() {
        let mut user = new_user().into_user().unwrap();
        let before = user.clone();
        let patch = UserPatch {
            role: Some(Role::Admin),
            ..UserPatch::default()
        };

        patch.apply_to(&mut user);

        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.name, before.name);
        assert_eq!(user.email, before.email);
        assert_eq!(user.password_hash, before.password_hash);
        assert_eq!(user.active, before.active);
    }
}

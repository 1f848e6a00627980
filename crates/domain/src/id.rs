//! Typed identifier newtypes backed by strings.
//!
//! Identifiers are opaque strings: generated ones are UUIDs (orders,
//! products) or timestamp-derived (users), but any existing key can be
//! wrapped with [`From`].

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the id and return the raw string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Whether the identifier is empty or whitespace only.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for an [`Order`](crate::order::Order).
    OrderId
);

define_id!(
    /// Unique identifier for a [`Product`](crate::product::Product).
    ProductId
);

define_id!(
    /// Identifier of a [`User`](crate::user::User).
    UserId
);

impl OrderId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl ProductId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

static LAST_USER_NANOS: AtomicI64 = AtomicI64::new(0);

impl UserId {
    /// Generate a `user_<unix-nanos>` identifier.
    ///
    /// Successive calls in the same process always yield strictly
    /// increasing values, even when the clock does not advance.
    #[must_use]
    pub fn generate() -> Self {
        let now = crate::time::now()
            .timestamp_nanos_opt()
            .unwrap_or(i64::MAX);
        let mut last = LAST_USER_NANOS.load(Ordering::Relaxed);
        loop {
            let next = now.max(last.saturating_add(1));
            match LAST_USER_NANOS.compare_exchange_weak(
                last,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Self(format!("user_{next}")),
                Err(current) => last = current,
            }
        }
    }
}

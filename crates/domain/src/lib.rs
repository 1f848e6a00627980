//! # storefront-domain
//!
//! Pure domain model for the storefront services.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Orders** (a user's purchase referencing one or more products)
//! - Define **Products** (catalogue items with price, inventory and availability)
//! - Define **Users** (accounts with a role and an active flag)
//! - Define the **field update sets** (`*Patch`) used for partial updates
//! - Contain all invariant enforcement and input validation
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod order;
pub mod product;
pub mod user;

//! # storefront-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `OrderRepository`: orders plus their product associations
//!   - `ProductRepository`: products, keyset pages, atomic stock updates
//!   - `UserRepository`: user accounts
//! - Define **driving/inbound ports** as use-case structs:
//!   - `OrderService`: place, list, patch and delete orders
//!   - `ProductService`: catalogue CRUD, restock, availability, cursor pages
//!   - `UserService`: account CRUD
//! - Provide the opaque cursor helper used by product pagination
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `storefront-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.
//! The three services never depend on each other.

pub mod pagination;
pub mod ports;
pub mod services;

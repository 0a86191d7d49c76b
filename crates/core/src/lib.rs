//! Dimensional Designs Core - Shared types library.
//!
//! This crate provides the domain types used by every Dimensional Designs component:
//! - `storefront` - REST backend (auth, catalog, checkout)
//! - `cli` - Command-line tools for migrations and catalog seeding
//! - browser clients, which share the cart cookie format defined here
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and the password policy
//! - [`cart`] - Client cart cookie codec and checkout cart-line aggregation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartError, CartItem, CartLine, CartLines};
pub use types::*;

//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Customer signup, login and password hashing
//! - `catalog` - Product listing and lookup
//! - `checkout` - Purchase validation and atomic persistence
//!
//! Services borrow the pool for the duration of one request and never hold
//! state of their own. Identity is always passed in explicitly by the caller.

pub mod auth;
pub mod catalog;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use catalog::{CatalogError, CatalogService};
pub use checkout::{CheckoutError, CheckoutService, PurchaseRequest, ValidatedPurchase};

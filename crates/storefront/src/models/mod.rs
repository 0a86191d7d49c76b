//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`].

pub mod customer;
pub mod product;
pub mod purchase;
pub mod session;

pub use customer::Customer;
pub use product::Product;
pub use purchase::{Invoice, NewPurchase, PaymentCard, Purchase, PurchaseItem, ShippingAddress};
pub use session::{CurrentCustomer, keys as session_keys};

//! HTTP middleware stack for the storefront API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span carrying `request_id`)
//! 3. Request ID (honour or generate `x-request-id`)
//! 4. CORS (browser client origin, credentials allowed)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, end_session, set_current_customer};
pub use request_id::{RequestId, request_id_middleware};
pub use session::create_session_layer;

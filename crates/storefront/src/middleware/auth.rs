//! Authentication extractors.
//!
//! The session is resolved into a [`CurrentCustomer`] once, at the handler
//! boundary. Handlers receive the identity as a value and pass it on to
//! services explicitly.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentCustomer, session_keys};

/// Message returned when a protected route is called without a session.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized. Please log in.";

/// Extractor that requires an authenticated customer.
///
/// Runs before any body extractor, so an unauthenticated request is rejected
/// with 401 whatever its body contains.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(customer): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", customer.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

/// Rejection for [`RequireAuth`]: a 401 with a JSON error body.
#[derive(Debug)]
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": UNAUTHORIZED_MESSAGE })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalAuth(customer) = OptionalAuth::from_request_parts(parts, state)
            .await
            .unwrap_or(OptionalAuth(None));

        customer.map(Self).ok_or(AuthRejection)
    }
}

/// Extractor that reads the current customer if there is one.
///
/// A missing session layer, an unreadable session record or an anonymous
/// session all resolve to `None`.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self(None));
        };

        let customer = match session
            .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
            .await
        {
            Ok(customer) => customer,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session, treating as anonymous");
                None
            }
        };

        Ok(Self(customer))
    }
}

/// Store the logged-in customer in a freshly cycled session.
///
/// Cycling the id first means a session token issued before login never
/// becomes an authenticated one.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Destroy the session record and expire the cookie (logout).
///
/// # Errors
///
/// Returns an error if the store cannot delete the record.
pub async fn end_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

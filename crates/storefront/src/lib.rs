//! Dimensional Designs storefront library.
//!
//! The REST backend behind the Dimensional Designs web client: customer
//! accounts with cookie sessions, a read-only product catalog, and atomic
//! purchase recording. Built as a library so the router can be exercised in
//! tests without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    http::{HeaderValue, Method, Request, header},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;

/// Build the full storefront router around a session layer.
///
/// Sentry layers are added by the binary so tests can build the router
/// without a Sentry client.
pub fn app<S>(state: AppState, sessions: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    let cors = cors_layer(state.config().client_origin.as_deref());
    let images = ServeDir::new(&state.config().images_dir);

    Router::new()
        .merge(routes::routes())
        .nest_service("/images", images)
        .layer(sessions)
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// CORS for the browser client: one origin, cookies allowed.
fn cors_layer(client_origin: Option<&str>) -> CorsLayer {
    let Some(origin) = client_origin else {
        return CorsLayer::new();
    };

    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
        Err(e) => {
            tracing::warn!(error = %e, origin, "Ignoring invalid client origin");
            CorsLayer::new()
        }
    }
}

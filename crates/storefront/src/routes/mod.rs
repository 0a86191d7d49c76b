//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//! GET  /images/*               - Product image files
//!
//! # Products
//! GET  /products/all           - Every product, ordered by id
//! GET  /products/{id}          - One product
//! POST /products/purchase      - Record a purchase (requires session)
//!
//! # Users
//! POST /users/signup           - Register a customer
//! POST /users/login            - Start a session
//! POST /users/logout           - End the session
//! GET  /users/session          - Current session identity
//! ```

pub mod health;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/all", get(products::index))
        .route("/purchase", post(products::purchase))
        .route("/{id}", get(products::show))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .route("/session", get(users::session))
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/products", product_routes())
        .nest("/users", user_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use crate::config::tests::test_config;
    use crate::middleware::request_id::REQUEST_ID_HEADER;
    use crate::middleware::session::session_layer;
    use crate::state::AppState;

    /// Router over a pool that never connects; only paths that fail before
    /// touching the database are exercised here.
    fn test_app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/dimensional_designs_test")
            .unwrap();
        let state = AppState::new(test_config(), pool);
        crate::app(state, session_layer(MemoryStore::default(), false))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn test_get_product_non_numeric_id() {
        let (status, body) = send(get("/products/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Invalid product ID" }));
    }

    #[tokio::test]
    async fn test_get_product_out_of_range_id() {
        let (status, body) = send(get("/products/99999999999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Product not found" }));
    }

    #[tokio::test]
    async fn test_purchase_requires_session() {
        let bodies = [
            json!({}),
            json!({ "cart": "1,1,2", "customer_id": 1 }),
            json!("not an object"),
        ];

        for body in bodies {
            let (status, response) = send(post_json("/products/purchase", &body)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(response, json!({ "error": "Unauthorized. Please log in." }));
        }
    }

    #[tokio::test]
    async fn test_purchase_without_body_still_requires_session() {
        let request = Request::builder()
            .method("POST")
            .uri("/products/purchase")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_without_login() {
        let (status, body) = send(get("/users/session")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "error": "Not logged in" }));
    }

    #[tokio::test]
    async fn test_signup_missing_fields() {
        let body = json!({ "email": "ada@example.com", "password": "Abcdefg1" });
        let (status, response) = send(post_json("/users/signup", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": "All fields are required" }));
    }

    #[tokio::test]
    async fn test_signup_weak_password() {
        let body = json!({
            "email": "ada@example.com",
            "password": "abc12345",
            "first_name": "Ada",
            "last_name": "Lovelace"
        });
        let (status, response) = send(post_json("/users/signup", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response,
            json!({ "error": "Password does not meet policy requirements" })
        );
    }

    #[tokio::test]
    async fn test_signup_malformed_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/users/signup")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, response) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["error"].is_string());
    }

    #[tokio::test]
    async fn test_login_blank_fields() {
        let body = json!({ "email": "", "password": "" });
        let (status, response) = send(post_json("/users/login", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": "Email and password are required" }));
    }

    #[tokio::test]
    async fn test_logout_without_session() {
        let request = Request::builder()
            .method("POST")
            .uri("/users/logout")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Logged out successfully" }));
    }
}

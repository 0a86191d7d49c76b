//! Integration tests for Dimensional Designs.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations to the test database
//! cargo run -p dimensional-designs-cli -- migrate
//!
//! # Start the API against the same database
//! cargo run -p dimensional-designs-storefront
//!
//! # Run the ignored tests
//! cargo test -p dimensional-designs-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - API under test (default: <http://localhost:3000>)
//! - `STOREFRONT_DATABASE_URL` / `DATABASE_URL` - database the API uses
//!
//! Every test creates its own customer with a unique email, so runs do not
//! interfere with each other or with existing data.

#![allow(clippy::missing_panics_doc)]

use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use dimensional_designs_core::ProductId;

/// A password that satisfies the signup policy.
pub const STRONG_PASSWORD: &str = "Printing3D";

/// Base URL for the storefront API.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// HTTP client that keeps the session cookie between requests.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// An email no other test run will have used.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@example.com", Uuid::new_v4())
}

/// Connect to the database the storefront under test uses.
pub async fn pool() -> PgPool {
    let url = std::env::var("STOREFRONT_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("STOREFRONT_DATABASE_URL or DATABASE_URL must be set");

    dimensional_designs_storefront::db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database")
}

/// Insert a throwaway product and return its id.
pub async fn insert_product(pool: &PgPool, cost: Decimal) -> ProductId {
    let (id,): (i32,) = sqlx::query_as(
        r"
        INSERT INTO product (name, description, cost, image_filename)
        VALUES ($1, 'Integration test print', $2, 'test.png')
        RETURNING product_id
        ",
    )
    .bind(format!("it-product-{}", Uuid::new_v4()))
    .bind(cost)
    .fetch_one(pool)
    .await
    .expect("Failed to insert product");

    ProductId::new(id)
}

/// Sign up a fresh customer through the API and log the client in.
pub async fn signup_and_login(client: &Client, email: &str) -> Value {
    let base_url = storefront_base_url();

    let resp = client
        .post(format!("{base_url}/users/signup"))
        .json(&json!({
            "email": email,
            "password": STRONG_PASSWORD,
            "first_name": "Ada",
            "last_name": "Lovelace"
        }))
        .send()
        .await
        .expect("Failed to sign up");
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

    let resp = client
        .post(format!("{base_url}/users/login"))
        .json(&json!({ "email": email, "password": STRONG_PASSWORD }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    resp.json().await.expect("Login body is not JSON")
}

/// A complete purchase body for the given cart string.
#[must_use]
pub fn purchase_body(cart: &str) -> Value {
    json!({
        "street": "12 Elm St",
        "city": "Halifax",
        "province": "NS",
        "country": "Canada",
        "postal_code": "B3H 1A1",
        "credit_card": "4111111111111111",
        "credit_expire": "12/29",
        "credit_cvv": "123",
        "cart": cart,
        "invoice_amt": 30.0,
        "invoice_tax": 4.5,
        "invoice_total": 34.5
    })
}

//! Integration tests for signup, login, session and logout.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - The storefront server running against it
//!
//! Run with: cargo test -p dimensional-designs-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use dimensional_designs_core::Email;
use dimensional_designs_integration_tests::{
    STRONG_PASSWORD, client, pool, signup_and_login, storefront_base_url, unique_email,
};
use dimensional_designs_storefront::db::CustomerRepository;

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_signup_login_session_logout_flow() {
    let client = client();
    let base_url = storefront_base_url();
    let email = unique_email();

    let login = signup_and_login(&client, &email).await;
    assert_eq!(login, json!({ "message": "Login successful", "email": email }));

    let resp = client
        .get(format!("{base_url}/users/session"))
        .send()
        .await
        .expect("Failed to get session");
    assert_eq!(resp.status(), StatusCode::OK);
    let session: Value = resp.json().await.expect("Session body is not JSON");

    // Identity fields match the stored customer exactly
    let pool = pool().await;
    let (customer, _) = CustomerRepository::new(&pool)
        .get_by_email(&Email::parse(&email).expect("valid email"))
        .await
        .expect("Failed to load customer")
        .expect("Customer missing");
    assert_eq!(
        session,
        json!({
            "customer_id": customer.id.as_i32(),
            "email": email,
            "first_name": "Ada",
            "last_name": "Lovelace"
        })
    );

    let resp = client
        .post(format!("{base_url}/users/logout"))
        .send()
        .await
        .expect("Failed to log out");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/users/session"))
        .send()
        .await
        .expect("Failed to get session");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_signup_response_never_contains_hash() {
    let client = client();
    let base_url = storefront_base_url();
    let email = unique_email();

    let resp = client
        .post(format!("{base_url}/users/signup"))
        .json(&json!({
            "email": email,
            "password": STRONG_PASSWORD,
            "first_name": "Grace",
            "last_name": "Hopper"
        }))
        .send()
        .await
        .expect("Failed to sign up");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("Signup body is not JSON");
    assert_eq!(
        body,
        json!({ "message": "User registered successfully", "user": { "email": email } })
    );

    let pool = pool().await;
    let (stored,): (String,) = sqlx::query_as("SELECT password FROM customer WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .expect("Failed to read stored hash");
    assert_ne!(stored, STRONG_PASSWORD);
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_duplicate_email_is_rejected_without_second_row() {
    let client = client();
    let base_url = storefront_base_url();
    let email = unique_email();
    let body = json!({
        "email": email,
        "password": STRONG_PASSWORD,
        "first_name": "Ada",
        "last_name": "Lovelace"
    });

    let first = client
        .post(format!("{base_url}/users/signup"))
        .json(&body)
        .send()
        .await
        .expect("Failed to sign up");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client
        .post(format!("{base_url}/users/signup"))
        .json(&body)
        .send()
        .await
        .expect("Failed to sign up");
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let error: Value = second.json().await.expect("Error body is not JSON");
    assert_eq!(error, json!({ "error": "Email already in use" }));

    let pool = pool().await;
    let count = CustomerRepository::new(&pool)
        .count_by_email(&Email::parse(&email).expect("valid email"))
        .await
        .expect("Failed to count customers");
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "Requires running storefront server and PostgreSQL"]
async fn test_login_distinguishes_unknown_email_and_wrong_password() {
    let client = client();
    let base_url = storefront_base_url();
    let email = unique_email();
    signup_and_login(&client, &email).await;

    let fresh = dimensional_designs_integration_tests::client();

    let resp = fresh
        .post(format!("{base_url}/users/login"))
        .json(&json!({ "email": unique_email(), "password": STRONG_PASSWORD }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = fresh
        .post(format!("{base_url}/users/login"))
        .json(&json!({ "email": email, "password": "Wrong1234" }))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // A failed login establishes no session
    let resp = fresh
        .get(format!("{base_url}/users/session"))
        .send()
        .await
        .expect("Failed to get session");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

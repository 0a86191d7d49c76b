//! Customer account and session route handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use dimensional_designs_core::Email;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{OptionalAuth, end_session, set_current_customer};
use crate::models::CurrentCustomer;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Signup request body. Absent fields decode as empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Login request body. Absent fields decode as empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub user: SignupUser,
}

#[derive(Debug, Serialize)]
pub struct SignupUser {
    pub email: Email,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub email: Email,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new customer.
#[tracing::instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse> {
    let customer = AuthService::new(state.pool())
        .signup(
            &request.email,
            &request.password,
            &request.first_name,
            &request.last_name,
        )
        .await
        .map_err(|e| match e {
            AuthError::MissingFields => AppError::BadRequest("All fields are required".to_string()),
            AuthError::WeakPassword(_) => {
                AppError::BadRequest("Password does not meet policy requirements".to_string())
            }
            AuthError::InvalidEmail(_) => AppError::BadRequest("Invalid email address".to_string()),
            AuthError::EmailTaken => AppError::BadRequest("Email already in use".to_string()),
            other => AppError::internal("Failed to register user", other),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User registered successfully",
            user: SignupUser {
                email: customer.email,
            },
        }),
    ))
}

/// Verify credentials and establish a session.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let customer = AuthService::new(state.pool())
        .login(&request.email, &request.password)
        .await
        .map_err(|e| match e {
            AuthError::MissingFields => {
                AppError::BadRequest("Email and password are required".to_string())
            }
            AuthError::CustomerNotFound => AppError::NotFound("User not found".to_string()),
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("Invalid credentials".to_string())
            }
            other => AppError::internal("An error occurred while trying to log in", other),
        })?;

    let current = CurrentCustomer::from(&customer);
    set_current_customer(&session, &current)
        .await
        .map_err(|e| AppError::internal("An error occurred while trying to log in", e))?;

    set_sentry_user(&customer.id, Some(customer.email.as_str()));
    tracing::info!(customer_id = %customer.id, "Customer logged in");

    Ok(Json(LoginResponse {
        message: "Login successful",
        email: customer.email,
    }))
}

/// Destroy the current session.
#[tracing::instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Json<MessageResponse>> {
    end_session(&session)
        .await
        .map_err(|e| AppError::internal("Failed to log out", e))?;

    clear_sentry_user();

    Ok(Json(MessageResponse {
        message: "Logged out successfully",
    }))
}

/// Return the identity stored in the current session.
pub async fn session(OptionalAuth(customer): OptionalAuth) -> Result<Json<CurrentCustomer>> {
    customer
        .map(Json)
        .ok_or_else(|| AppError::Unauthorized("Not logged in".to_string()))
}

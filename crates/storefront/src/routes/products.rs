//! Product and purchase route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::{Product, Purchase};
use crate::services::{CatalogError, CatalogService, CheckoutError, CheckoutService, PurchaseRequest};
use crate::state::AppState;

/// Body of a successful purchase.
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub message: &'static str,
    pub purchase: Purchase,
}

/// List every product.
#[tracing::instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = CatalogService::new(state.pool())
        .list_products()
        .await
        .map_err(|e| AppError::internal("An error occurred while retrieving products", e))?;

    Ok(Json(products))
}

/// Show one product by id.
#[tracing::instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let product = CatalogService::new(state.pool())
        .get_product(&id)
        .await
        .map_err(|e| match e {
            CatalogError::InvalidId => AppError::BadRequest("Invalid product ID".to_string()),
            CatalogError::NotFound => AppError::NotFound("Product not found".to_string()),
            CatalogError::Repository(_) => {
                AppError::internal("An error occurred while retrieving the product", e)
            }
        })?;

    Ok(Json(product))
}

/// Record a purchase for the logged-in customer.
///
/// The customer id comes from the session; any id in the body is ignored.
#[tracing::instrument(skip_all)]
pub async fn purchase(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    ApiJson(request): ApiJson<PurchaseRequest>,
) -> Result<impl IntoResponse> {
    add_breadcrumb("checkout", "Purchase submitted", None);

    let purchase = CheckoutService::new(state.pool())
        .purchase(customer.customer_id, request)
        .await
        .map_err(|e| match e {
            CheckoutError::MissingFields => {
                AppError::BadRequest("Missing required fields".to_string())
            }
            CheckoutError::InvalidCart(cart) => {
                tracing::debug!(error = %cart, "Rejected cart");
                AppError::BadRequest("Invalid cart".to_string())
            }
            CheckoutError::Repository(_) => {
                AppError::internal("An error occurred during purchase", e)
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(PurchaseResponse {
            message: "Purchase successful",
            purchase,
        }),
    ))
}

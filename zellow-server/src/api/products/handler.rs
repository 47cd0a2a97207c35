//! Product API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Product, ProductUpsert, Role};
use shared::util::now_millis;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::ProductRepository;
use crate::utils::validation::validate;

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.storage.list_products()?))
}

pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<String>) -> AppResult<Json<Product>> {
    let product = state
        .storage
        .get_product(&id)?
        .ok_or_else(|| AppError::with_message(ErrorCode::ProductNotFound, format!("Product {} not found", id)))?;
    Ok(Json(product))
}

/// Create or replace a product, stock included
pub async fn upsert(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpsert>,
) -> AppResult<Json<Product>> {
    user.require_roles(&[Role::Admin, Role::Inventory], "manage products")?;
    validate(&payload)?;
    if payload.price < Decimal::ZERO {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            "Price must not be negative",
        ));
    }

    let product = Product {
        id,
        name: payload.name.trim().to_string(),
        price: payload.price,
        stock: payload.stock,
        image_url: payload.image_url,
        category: payload.category,
        customization_options: payload.customization_options,
        updated_at: now_millis(),
    };
    state.storage.upsert_product(&product)?;

    tracing::info!(
        product_id = %product.id,
        stock = product.stock,
        price = %product.price,
        actor_id = %user.id,
        "Product saved"
    );
    Ok(Json(product))
}

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tripdesk_catalog::{Product, ProductError};
use tripdesk_core::search::{search_products, ProductSearchQuery, SearchPage};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/products", get(list_products))
        .route("/v1/products/{id}", get(get_product))
}

async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductSearchQuery>,
) -> Result<Json<SearchPage<Product>>, AppError> {
    let products = state.products.list_products().await.map_err(AppError::repo)?;
    Ok(Json(search_products(products, &query)))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    state.products.get_product(id).await
        .map_err(AppError::repo)?
        .filter(|p| p.is_active)
        .map(Json)
        .ok_or_else(|| AppError::product(ProductError::NotFound(id.to_string())))
}

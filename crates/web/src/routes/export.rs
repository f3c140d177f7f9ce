//! JSON export endpoints.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::{OrderRepository, ProductRepository};
use crate::error::AppError;
use crate::middleware::{Operation, RequestContext};
use crate::services::export::{OrdersExport, ProductsExport, export_orders, export_products};
use crate::state::AppState;

/// Every product, archived included, in pk order.
#[instrument(skip_all)]
pub async fn products(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<ProductsExport>, AppError> {
    ctx.authorize(Operation::ProductsExport)?;

    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(Json(export_products(&products)))
}

/// Every order with its products. Staff only.
#[instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<OrdersExport>, AppError> {
    ctx.authorize(Operation::OrdersExport)?;

    let repo = OrderRepository::new(state.pool());
    let orders = repo.list_all().await?;
    let links = repo.product_links().await?;
    let products = ProductRepository::new(state.pool()).list_all().await?;

    Ok(Json(export_orders(&orders, &products, &links)))
}

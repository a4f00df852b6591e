use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::handlers::common::{created, ok, PaginationParams};
use crate::services::stock::{MovementFilter, RecordMovementRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movements", get(list_movements).post(record_movement))
        .route("/reconcile/:product_id", post(reconcile_stock))
        .route("/summary", get(stock_summary))
}

async fn record_movement(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(request): Json<RecordMovementRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state
        .services
        .stock
        .record_movement(user.enterprise_id, request)
        .await?;
    Ok(created(response))
}

async fn list_movements(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(filter): Query<MovementFilter>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .stock
        .list_movements(
            user.enterprise_id,
            filter,
            pagination.page(),
            pagination.per_page(),
        )
        .await?;
    Ok(ok(page))
}

async fn reconcile_stock(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state
        .services
        .stock
        .reconcile_stock(user.enterprise_id, product_id)
        .await?;
    Ok(ok(response))
}

#[derive(Debug, serde::Deserialize)]
struct SummaryQuery {
    from: Option<chrono::DateTime<chrono::Utc>>,
    to: Option<chrono::DateTime<chrono::Utc>>,
}

async fn stock_summary(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state
        .services
        .stock
        .stock_summary(user.enterprise_id, query.from, query.to)
        .await?;
    Ok(ok(summary))
}

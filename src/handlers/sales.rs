use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::entities::sale::SaleStatus;
use crate::errors::ServiceError;
use crate::handlers::common::{created, no_content, ok, PaginationParams};
use crate::services::sales::CreateSaleRequest;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/:id", get(get_sale).delete(delete_sale))
        .route("/:id/cancel", post(cancel_sale))
}

#[derive(Debug, Deserialize)]
struct SaleListQuery {
    status: Option<SaleStatus>,
}

async fn create_sale(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(request): Json<CreateSaleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state
        .services
        .sales
        .create_sale(user.enterprise_id, request)
        .await?;
    Ok(created(response))
}

async fn list_sales(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<SaleListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .sales
        .list_sales(
            user.enterprise_id,
            query.status,
            pagination.page(),
            pagination.per_page(),
        )
        .await?;
    Ok(ok(page))
}

async fn get_sale(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state.services.sales.get_sale(user.enterprise_id, id).await?;
    Ok(ok(response))
}

async fn cancel_sale(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state
        .services
        .sales
        .cancel_sale(user.enterprise_id, id)
        .await?;
    Ok(ok(response))
}

async fn delete_sale(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .sales
        .delete_sale(user.enterprise_id, id)
        .await?;
    Ok(no_content())
}

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::entities::budget::BudgetStatus;
use crate::errors::ServiceError;
use crate::handlers::common::{created, no_content, ok, PaginationParams};
use crate::services::budgets::UpsertBudgetRequest;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_budgets).post(create_budget))
        .route(
            "/:id",
            get(get_budget).put(update_budget).delete(delete_budget),
        )
        .route("/:id/status", patch(update_budget_status))
}

#[derive(Debug, Deserialize)]
struct BudgetListQuery {
    status: Option<BudgetStatus>,
}

#[derive(Debug, Deserialize)]
struct UpdateBudgetStatusRequest {
    status: BudgetStatus,
}

async fn create_budget(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(mut request): Json<UpsertBudgetRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.id = None;
    let response = state
        .services
        .budgets
        .upsert_budget(user.enterprise_id, request)
        .await?;
    Ok(created(response))
}

async fn update_budget(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(mut request): Json<UpsertBudgetRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.id = Some(id);
    let response = state
        .services
        .budgets
        .upsert_budget(user.enterprise_id, request)
        .await?;
    Ok(ok(response))
}

async fn list_budgets(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(query): Query<BudgetListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .budgets
        .list_budgets(
            user.enterprise_id,
            query.status,
            pagination.page(),
            pagination.per_page(),
        )
        .await?;
    Ok(ok(page))
}

async fn get_budget(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state
        .services
        .budgets
        .get_budget(user.enterprise_id, id)
        .await?;
    Ok(ok(response))
}

async fn update_budget_status(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBudgetStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let budget = state
        .services
        .budgets
        .update_budget_status(user.enterprise_id, id, request.status)
        .await?;
    Ok(ok(budget))
}

async fn delete_budget(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .budgets
        .delete_budget(user.enterprise_id, id)
        .await?;
    Ok(no_content())
}

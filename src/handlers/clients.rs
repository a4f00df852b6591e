use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::handlers::common::{created, no_content, ok, PaginationParams};
use crate::services::clients::{CreateClientRequest, UpdateClientRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
}

async fn create_client(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(request): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = state
        .services
        .clients
        .create_client(user.enterprise_id, request)
        .await?;
    Ok(created(client))
}

async fn list_clients(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .clients
        .list_clients(user.enterprise_id, pagination.page(), pagination.per_page())
        .await?;
    Ok(ok(page))
}

async fn get_client(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = state
        .services
        .clients
        .get_client(user.enterprise_id, id)
        .await?;
    Ok(ok(client))
}

async fn update_client(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = state
        .services
        .clients
        .update_client(user.enterprise_id, id, request)
        .await?;
    Ok(ok(client))
}

async fn delete_client(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .clients
        .delete_client(user.enterprise_id, id)
        .await?;
    Ok(no_content())
}

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
use crate::services::products::{CreateProductRequest, ProductFilter, UpdateProductRequest};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/categories", get(list_categories))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(request): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state
        .services
        .products
        .create_product(user.enterprise_id, request)
        .await?;
    Ok(created(product))
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Query(filter): Query<ProductFilter>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let page = state
        .services
        .products
        .list_products(
            user.enterprise_id,
            filter,
            pagination.page(),
            pagination.per_page(),
        )
        .await?;
    Ok(ok(page))
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = state
        .services
        .products
        .list_categories(user.enterprise_id)
        .await?;
    Ok(ok(categories))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state
        .services
        .products
        .get_product(user.enterprise_id, id)
        .await?;
    Ok(ok(product))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state
        .services
        .products
        .update_product(user.enterprise_id, id, request)
        .await?;
    Ok(ok(product))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .products
        .delete_product(user.enterprise_id, id)
        .await?;
    Ok(no_content())
}

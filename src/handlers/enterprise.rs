use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;

use crate::auth::AuthenticatedUser;
use crate::errors::ServiceError;
use crate::handlers::common::ok;
use crate::services::enterprise::UpdateEnterpriseRequest;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_profile).put(update_profile))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state
        .services
        .enterprise
        .get_profile(user.enterprise_id)
        .await?;
    Ok(ok(profile))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateEnterpriseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state
        .services
        .enterprise
        .update_profile(user.enterprise_id, request)
        .await?;
    Ok(ok(profile))
}

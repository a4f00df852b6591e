//! Gestor API Library
//!
//! Back-office API for small-business management: product catalog, stock
//! ledger, sales and budgets, scoped per enterprise tenant.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;

use axum::{extract::State, response::Json, routing::get, Extension, Router};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
    pub token_keys: Arc<auth::TokenKeys>,
}

/// Builds the full application router with all resource routes mounted.
pub fn app_router(state: Arc<AppState>) -> Router {
    let token_keys = state.token_keys.clone();

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/products", handlers::products::routes())
        .nest("/api/v1/stock", handlers::stock::routes())
        .nest("/api/v1/sales", handlers::sales::routes())
        .nest("/api/v1/budgets", handlers::budgets::routes())
        .nest("/api/v1/clients", handlers::clients::routes())
        .nest("/api/v1/suppliers", handlers::suppliers::routes())
        .nest("/api/v1/enterprise", handlers::enterprise::routes())
        .layer(Extension(token_keys))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// Liveness probe: reports process health and database reachability.
async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let db_ok = state.db.ping().await.is_ok();
    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

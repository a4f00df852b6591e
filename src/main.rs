use anyhow::Context;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};

use gestor_api::cache::InMemoryCache;
use gestor_api::config::{init_tracing, load_config};
use gestor_api::events::{process_events, EventSender};
use gestor_api::handlers::AppServices;
use gestor_api::services::StockPolicy;
use gestor_api::{app_router, auth, db, AppState};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(&config.log_level, config.log_json);

    info!(
        environment = %config.environment,
        addr = %config.server_addr(),
        "starting gestor-api"
    );

    let db_pool = db::establish_connection_from_app_config(&config)
        .await
        .context("failed to connect to the database")?;

    if config.auto_migrate {
        db::run_migrations(&db_pool).await.context("migrations failed")?;
    }

    let db_pool = Arc::new(db_pool);

    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let event_sender = EventSender::new(event_tx);
    let cache = Arc::new(InMemoryCache::new());
    let event_loop = tokio::spawn(process_events(event_rx, cache));

    let policy = StockPolicy {
        allow_negative_stock: config.allow_negative_stock,
    };
    let services = AppServices::new(db_pool.clone(), Arc::new(event_sender.clone()), policy);
    let token_keys = Arc::new(auth::TokenKeys::new(
        &config.jwt_secret,
        config.jwt_expiration_secs,
    ));

    let addr = config.server_addr();
    let state = Arc::new(AppState {
        db: db_pool,
        config,
        event_sender,
        services,
        token_keys,
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // The router owns the last event sender; once it is dropped the
    // processing loop drains and exits.
    if let Err(e) = event_loop.await {
        warn!(error = %e, "event processing loop ended abnormally");
    }

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c, shutting down"),
        _ = terminate => info!("received terminate signal, shutting down"),
    }
}

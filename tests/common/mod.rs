//! Shared test harness: one temporary SQLite database file per test binary,
//! migrated once. Tests isolate themselves by provisioning their own
//! enterprise, so they can run concurrently against the shared database.
//!
//! A file-backed database is used instead of `sqlite::memory:` because each
//! `#[tokio::test]` runs on its own runtime; an in-memory database would be
//! dropped as soon as the first test's runtime shut down its connections.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, OnceCell};
use uuid::Uuid;

use gestor_api::db::{self, DbConfig, DbPool};
use gestor_api::events::EventSender;
use gestor_api::handlers::AppServices;
use gestor_api::services::enterprise::CreateEnterpriseRequest;
use gestor_api::services::products::CreateProductRequest;
use gestor_api::services::StockPolicy;

static DB: OnceCell<Arc<DbPool>> = OnceCell::const_new();

pub async fn test_db() -> Arc<DbPool> {
    DB.get_or_init(|| async {
        let path = std::env::temp_dir().join(format!("gestor-test-{}.sqlite", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let config = DbConfig {
            url: format!("sqlite://{}?mode=rwc", path.display()),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
        };
        let pool = db::establish_connection_with_config(&config)
            .await
            .expect("test database should connect");
        db::run_migrations(&pool)
            .await
            .expect("migrations should apply");
        Arc::new(pool)
    })
    .await
    .clone()
}

/// Event sender wired to a drain task, so mutations never block on a full
/// channel.
pub fn drained_event_sender() -> Arc<EventSender> {
    let (tx, mut rx) = mpsc::channel(64);
    tokio::spawn(async move { while rx.recv().await.is_some() {} });
    Arc::new(EventSender::new(tx))
}

pub struct TestContext {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub enterprise_id: Uuid,
}

/// Fresh tenant with the default (permissive) stock policy.
pub async fn setup() -> TestContext {
    setup_with_policy(StockPolicy {
        allow_negative_stock: true,
    })
    .await
}

pub async fn setup_with_policy(policy: StockPolicy) -> TestContext {
    let db = test_db().await;
    let services = AppServices::new(db.clone(), drained_event_sender(), policy);

    let enterprise = services
        .enterprise
        .create_enterprise(CreateEnterpriseRequest {
            name: format!("Test Enterprise {}", Uuid::new_v4()),
            legal_name: None,
            document: None,
            email: None,
            phone: None,
            address: None,
        })
        .await
        .expect("tenant should provision");

    TestContext {
        db,
        services,
        enterprise_id: enterprise.id,
    }
}

impl TestContext {
    /// Creates a published product with the given opening stock.
    pub async fn seed_product(
        &self,
        name: &str,
        sale_price_cents: i64,
        initial_quantity: i32,
    ) -> gestor_api::entities::product::Model {
        self.services
            .products
            .create_product(
                self.enterprise_id,
                CreateProductRequest {
                    name: name.to_string(),
                    category: Some("geral".to_string()),
                    purchase_price_cents: sale_price_cents / 2,
                    sale_price_cents,
                    initial_quantity: Some(initial_quantity),
                    publish_for_sale: true,
                    image_url: None,
                },
            )
            .await
            .expect("product should be created")
    }
}

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use gestor_api::entities::budget::BudgetStatus;
use gestor_api::entities::client;
use gestor_api::errors::ServiceError;
use gestor_api::services::budgets::{BudgetItemInput, UpsertBudgetRequest};

fn quote(items: Vec<BudgetItemInput>) -> UpsertBudgetRequest {
    UpsertBudgetRequest {
        id: None,
        client_name: "Maria".to_string(),
        client_phone: "11 99999-0001".to_string(),
        valid_until: None,
        notes: None,
        items,
    }
}

fn line(name: &str, quantity: i32, unit_price_cents: i64) -> BudgetItemInput {
    BudgetItemInput {
        product_id: uuid::Uuid::new_v4(),
        product_name: name.to_string(),
        quantity,
        unit_price_cents,
    }
}

#[tokio::test]
async fn budgets_resolve_clients_by_phone() {
    let ctx = common::setup().await;

    let first = ctx
        .services
        .budgets
        .upsert_budget(ctx.enterprise_id, quote(vec![line("Porta", 1, 25_000)]))
        .await
        .unwrap();
    let second = ctx
        .services
        .budgets
        .upsert_budget(ctx.enterprise_id, quote(vec![line("Janela", 2, 18_000)]))
        .await
        .unwrap();

    // Same phone, same client row.
    assert_eq!(first.budget.client_id, second.budget.client_id);

    let clients = client::Entity::find()
        .filter(client::Column::EnterpriseId.eq(ctx.enterprise_id))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].name, "Maria");
}

#[tokio::test]
async fn totals_are_computed_from_items() {
    let ctx = common::setup().await;

    let response = ctx
        .services
        .budgets
        .upsert_budget(
            ctx.enterprise_id,
            quote(vec![line("Porta", 2, 25_000), line("Fechadura", 3, 4_500)]),
        )
        .await
        .unwrap();

    assert_eq!(response.budget.total_cents, 2 * 25_000 + 3 * 4_500);
    assert_eq!(response.budget.status, BudgetStatus::Offered.as_str());
    assert_eq!(response.items.len(), 2);
    assert_eq!(response.items[0].total_cents, 50_000);

    // Default validity is thirty days out.
    let days = (response.budget.valid_until - Utc::now()).num_days();
    assert!((29..=30).contains(&days), "validity was {days} days");
}

#[tokio::test]
async fn update_replaces_items_and_recomputes_the_total() {
    let ctx = common::setup().await;

    let created = ctx
        .services
        .budgets
        .upsert_budget(ctx.enterprise_id, quote(vec![line("Porta", 1, 25_000)]))
        .await
        .unwrap();

    let mut update = quote(vec![line("Portão", 1, 90_000)]);
    update.id = Some(created.budget.id);
    update.valid_until = Some(Utc::now() + Duration::days(10));
    let updated = ctx
        .services
        .budgets
        .upsert_budget(ctx.enterprise_id, update)
        .await
        .unwrap();

    assert_eq!(updated.budget.id, created.budget.id);
    assert_eq!(updated.budget.total_cents, 90_000);
    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.items[0].product_name, "Portão");
}

#[tokio::test]
async fn update_without_a_deadline_keeps_the_stored_one() {
    let ctx = common::setup().await;

    let mut create = quote(vec![line("Porta", 1, 25_000)]);
    create.valid_until = Some(Utc::now() + Duration::days(7));
    let created = ctx
        .services
        .budgets
        .upsert_budget(ctx.enterprise_id, create)
        .await
        .unwrap();

    let mut update = quote(vec![line("Porta", 2, 25_000)]);
    update.id = Some(created.budget.id);
    update.valid_until = None;
    let updated = ctx
        .services
        .budgets
        .upsert_budget(ctx.enterprise_id, update)
        .await
        .unwrap();

    assert_eq!(updated.budget.valid_until, created.budget.valid_until);
    assert_eq!(updated.budget.total_cents, 50_000);
}

#[tokio::test]
async fn status_transitions_are_recorded() {
    let ctx = common::setup().await;

    let created = ctx
        .services
        .budgets
        .upsert_budget(ctx.enterprise_id, quote(vec![line("Porta", 1, 25_000)]))
        .await
        .unwrap();

    let accepted = ctx
        .services
        .budgets
        .update_budget_status(ctx.enterprise_id, created.budget.id, BudgetStatus::Accepted)
        .await
        .unwrap();
    assert_eq!(accepted.status, BudgetStatus::Accepted.as_str());

    let rejected = ctx
        .services
        .budgets
        .update_budget_status(ctx.enterprise_id, created.budget.id, BudgetStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(rejected.status, BudgetStatus::Rejected.as_str());
}

#[tokio::test]
async fn budgets_never_touch_stock() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Dobradiça", 800, 12).await;

    let mut request = quote(vec![BudgetItemInput {
        product_id: prod.id,
        product_name: prod.name.clone(),
        quantity: 5,
        unit_price_cents: prod.sale_price_cents,
    }]);
    request.client_phone = "11 98888-0002".to_string();

    let created = ctx
        .services
        .budgets
        .upsert_budget(ctx.enterprise_id, request)
        .await
        .unwrap();
    ctx.services
        .budgets
        .update_budget_status(ctx.enterprise_id, created.budget.id, BudgetStatus::Accepted)
        .await
        .unwrap();
    ctx.services
        .budgets
        .delete_budget(ctx.enterprise_id, created.budget.id)
        .await
        .unwrap();

    let untouched = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(untouched.quantity_in_stock, 12);
}

#[tokio::test]
async fn deletion_is_allowed_in_any_status() {
    let ctx = common::setup().await;

    let created = ctx
        .services
        .budgets
        .upsert_budget(ctx.enterprise_id, quote(vec![line("Porta", 1, 25_000)]))
        .await
        .unwrap();
    ctx.services
        .budgets
        .update_budget_status(ctx.enterprise_id, created.budget.id, BudgetStatus::Accepted)
        .await
        .unwrap();

    ctx.services
        .budgets
        .delete_budget(ctx.enterprise_id, created.budget.id)
        .await
        .unwrap();

    let err = ctx
        .services
        .budgets
        .get_budget(ctx.enterprise_id, created.budget.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn empty_budgets_are_rejected() {
    let ctx = common::setup().await;

    let err = ctx
        .services
        .budgets
        .upsert_budget(ctx.enterprise_id, quote(vec![]))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

mod common;

use assert_matches::assert_matches;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use gestor_api::entities::sale::{self, SaleStatus};
use gestor_api::entities::stock_movement::{self, MovementType};
use gestor_api::errors::ServiceError;
use gestor_api::services::sales::{CreateSaleRequest, SaleItemInput};
use gestor_api::services::StockPolicy;

fn sale_of(product_id: uuid::Uuid, quantity: i32) -> CreateSaleRequest {
    CreateSaleRequest {
        client_id: None,
        payment_method: "pix".to_string(),
        notes: None,
        items: vec![SaleItemInput {
            product_id,
            quantity,
        }],
    }
}

#[tokio::test]
async fn creating_a_sale_debits_stock_and_computes_totals() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Martelo", 3500, 10).await;

    let response = ctx
        .services
        .sales
        .create_sale(ctx.enterprise_id, sale_of(prod.id, 4))
        .await
        .unwrap();

    assert_eq!(response.sale.status, SaleStatus::Completed.as_str());
    assert_eq!(response.sale.total_cents, 4 * 3500);
    assert_eq!(response.items.len(), 1);
    assert_eq!(response.items[0].product_name, "Martelo");
    assert_eq!(response.items[0].unit_price_cents, 3500);

    let after = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(after.quantity_in_stock, 6);

    let exits = stock_movement::Entity::find()
        .filter(stock_movement::Column::ProductId.eq(prod.id))
        .filter(stock_movement::Column::MovementType.eq(MovementType::Exit.as_str()))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(exits.len(), 1);
    assert_eq!(exits[0].reason, "venda");
}

#[tokio::test]
async fn cancellation_restores_stock_with_compensating_entries() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Serrote", 6000, 10).await;

    let first = ctx
        .services
        .sales
        .create_sale(ctx.enterprise_id, sale_of(prod.id, 4))
        .await
        .unwrap();
    ctx.services
        .sales
        .create_sale(ctx.enterprise_id, sale_of(prod.id, 6))
        .await
        .unwrap();

    let zeroed = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(zeroed.quantity_in_stock, 0);

    let cancelled = ctx
        .services
        .sales
        .cancel_sale(ctx.enterprise_id, first.sale.id)
        .await
        .unwrap();
    assert_eq!(cancelled.sale.status, SaleStatus::Cancelled.as_str());

    let restored = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(restored.quantity_in_stock, 4);

    // The original exit stays in the log; the restoration is a new entry.
    let entries = stock_movement::Entity::find()
        .filter(stock_movement::Column::ProductId.eq(prod.id))
        .filter(stock_movement::Column::Reason.eq("cancelamento de venda"))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].movement_type, MovementType::Entry.as_str());
    assert_eq!(entries[0].quantity, 4);
}

#[tokio::test]
async fn stock_follows_a_full_sale_and_cancellation_chain() {
    use gestor_api::entities::product::StockStatus;
    use gestor_api::services::stock::RecordMovementRequest;

    let ctx = common::setup().await;
    let prod = ctx.seed_product("Furadeira", 25_000, 10).await;

    let small_sale = ctx
        .services
        .sales
        .create_sale(ctx.enterprise_id, sale_of(prod.id, 2))
        .await
        .unwrap();

    ctx.services
        .stock
        .record_movement(
            ctx.enterprise_id,
            RecordMovementRequest {
                product_id: prod.id,
                movement_type: MovementType::Exit,
                quantity: 4,
                reason: "ajuste".to_string(),
            },
        )
        .await
        .unwrap();

    let mid = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(mid.quantity_in_stock, 4);
    assert_eq!(mid.stock_status, StockStatus::InStock.as_str());

    ctx.services
        .sales
        .create_sale(ctx.enterprise_id, sale_of(prod.id, 4))
        .await
        .unwrap();

    let empty = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(empty.quantity_in_stock, 0);
    assert_eq!(empty.stock_status, StockStatus::OutOfStock.as_str());

    ctx.services
        .sales
        .cancel_sale(ctx.enterprise_id, small_sale.sale.id)
        .await
        .unwrap();

    let restored = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(restored.quantity_in_stock, 2);
    assert_eq!(restored.stock_status, StockStatus::InStock.as_str());
}

#[tokio::test]
async fn cancelling_twice_is_rejected() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Chave", 1200, 5).await;

    let sale = ctx
        .services
        .sales
        .create_sale(ctx.enterprise_id, sale_of(prod.id, 2))
        .await
        .unwrap();
    ctx.services
        .sales
        .cancel_sale(ctx.enterprise_id, sale.sale.id)
        .await
        .unwrap();

    let err = ctx
        .services
        .sales
        .cancel_sale(ctx.enterprise_id, sale.sale.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));

    // Stock restored exactly once.
    let after = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(after.quantity_in_stock, 5);
}

#[tokio::test]
async fn only_cancelled_sales_may_be_deleted() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Trena", 1800, 5).await;

    let sale = ctx
        .services
        .sales
        .create_sale(ctx.enterprise_id, sale_of(prod.id, 1))
        .await
        .unwrap();

    let err = ctx
        .services
        .sales
        .delete_sale(ctx.enterprise_id, sale.sale.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidState(_));

    ctx.services
        .sales
        .cancel_sale(ctx.enterprise_id, sale.sale.id)
        .await
        .unwrap();
    ctx.services
        .sales
        .delete_sale(ctx.enterprise_id, sale.sale.id)
        .await
        .unwrap();

    let gone = sale::Entity::find_by_id(sale.sale.id)
        .one(ctx.db.as_ref())
        .await
        .unwrap();
    assert!(gone.is_none());

    // Ledger rows are audit history and survive the delete.
    let movements = stock_movement::Entity::find()
        .filter(stock_movement::Column::ProductId.eq(prod.id))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert_eq!(movements.len(), 3); // opening entry, sale exit, restoration
}

#[tokio::test]
async fn failed_sale_rolls_back_every_line() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Broca", 900, 10).await;

    let err = ctx
        .services
        .sales
        .create_sale(
            ctx.enterprise_id,
            CreateSaleRequest {
                client_id: None,
                payment_method: "pix".to_string(),
                notes: None,
                items: vec![
                    SaleItemInput {
                        product_id: prod.id,
                        quantity: 3,
                    },
                    SaleItemInput {
                        product_id: uuid::Uuid::new_v4(),
                        quantity: 1,
                    },
                ],
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // The first line's debit was rolled back with the sale.
    let untouched = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(untouched.quantity_in_stock, 10);

    let sales = sale::Entity::find()
        .filter(sale::Column::EnterpriseId.eq(ctx.enterprise_id))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert!(sales.is_empty());
}

#[tokio::test]
async fn strict_policy_rejects_overselling() {
    let ctx = common::setup_with_policy(StockPolicy {
        allow_negative_stock: false,
    })
    .await;
    let prod = ctx.seed_product("Lixa", 200, 3).await;

    let err = ctx
        .services
        .sales
        .create_sale(ctx.enterprise_id, sale_of(prod.id, 5))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    let untouched = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(untouched.quantity_in_stock, 3);
}

#[tokio::test]
async fn cancellation_fails_as_dependency_failure_when_product_is_gone() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Esquadro", 1500, 5).await;

    let sale = ctx
        .services
        .sales
        .create_sale(ctx.enterprise_id, sale_of(prod.id, 2))
        .await
        .unwrap();

    ctx.services
        .products
        .delete_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();

    let err = ctx
        .services
        .sales
        .cancel_sale(ctx.enterprise_id, sale.sale.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::DependencyFailure(_));

    // The status flip rolled back with the failed restoration.
    let still_completed = ctx
        .services
        .sales
        .get_sale(ctx.enterprise_id, sale.sale.id)
        .await
        .unwrap();
    assert_eq!(still_completed.sale.status, SaleStatus::Completed.as_str());
}

#[tokio::test]
async fn sales_require_at_least_one_item() {
    let ctx = common::setup().await;

    let err = ctx
        .services
        .sales
        .create_sale(
            ctx.enterprise_id,
            CreateSaleRequest {
                client_id: None,
                payment_method: "pix".to_string(),
                notes: None,
                items: vec![],
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

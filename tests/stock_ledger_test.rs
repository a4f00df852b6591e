mod common;

use assert_matches::assert_matches;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use gestor_api::entities::product::{self, StockStatus};
use gestor_api::entities::stock_movement::{self, MovementType};
use gestor_api::errors::ServiceError;
use gestor_api::services::stock::{MovementFilter, RecordMovementRequest};
use gestor_api::services::StockPolicy;

#[tokio::test]
async fn entry_and_exit_update_projection_and_ledger() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Parafuso", 150, 10).await;

    let response = ctx
        .services
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

    assert_eq!(response.product.quantity_in_stock, 6);
    assert_eq!(response.product.stock_status, StockStatus::InStock.as_str());
    assert_eq!(response.movement.previous_quantity, 10);
    assert_eq!(response.movement.new_quantity, 6);
    assert_eq!(response.movement.reason, "ajuste");

    // Opening stock plus the manual exit.
    let page = ctx
        .services
        .stock
        .list_movements(
            ctx.enterprise_id,
            MovementFilter {
                product_id: Some(prod.id),
                ..Default::default()
            },
            1,
            50,
        )
        .await
        .unwrap();
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn exit_below_zero_is_recorded_under_permissive_policy() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Prego", 50, 2).await;

    let response = ctx
        .services
        .stock
        .record_movement(
            ctx.enterprise_id,
            RecordMovementRequest {
                product_id: prod.id,
                movement_type: MovementType::Exit,
                quantity: 5,
                reason: "ajuste".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(response.product.quantity_in_stock, -3);
    assert_eq!(
        response.product.stock_status,
        StockStatus::OutOfStock.as_str()
    );
    assert_eq!(response.movement.previous_quantity, 2);
    assert_eq!(response.movement.new_quantity, -3);
}

#[tokio::test]
async fn exit_below_zero_is_rejected_under_strict_policy() {
    let ctx = common::setup_with_policy(StockPolicy {
        allow_negative_stock: false,
    })
    .await;
    let prod = ctx.seed_product("Arruela", 30, 2).await;

    let err = ctx
        .services
        .stock
        .record_movement(
            ctx.enterprise_id,
            RecordMovementRequest {
                product_id: prod.id,
                movement_type: MovementType::Exit,
                quantity: 5,
                reason: "ajuste".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    // Nothing applied: projection unchanged and no exit row in the ledger.
    let unchanged = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(unchanged.quantity_in_stock, 2);

    let exits = stock_movement::Entity::find()
        .filter(stock_movement::Column::ProductId.eq(prod.id))
        .filter(stock_movement::Column::MovementType.eq(MovementType::Exit.as_str()))
        .all(ctx.db.as_ref())
        .await
        .unwrap();
    assert!(exits.is_empty());
}

#[tokio::test]
async fn non_positive_quantities_are_rejected() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Porca", 80, 5).await;

    for quantity in [0, -3] {
        let err = ctx
            .services
            .stock
            .record_movement(
                ctx.enterprise_id,
                RecordMovementRequest {
                    product_id: prod.id,
                    movement_type: MovementType::Entry,
                    quantity,
                    reason: "ajuste".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }
}

#[tokio::test]
async fn movement_against_unknown_product_is_not_found() {
    let ctx = common::setup().await;

    let err = ctx
        .services
        .stock
        .record_movement(
            ctx.enterprise_id,
            RecordMovementRequest {
                product_id: uuid::Uuid::new_v4(),
                movement_type: MovementType::Entry,
                quantity: 1,
                reason: "ajuste".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn reconcile_rebuilds_projection_from_the_ledger() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Tinta", 2500, 10).await;

    // Corrupt the projection behind the ledger's back.
    let mut active: product::ActiveModel = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap()
        .into();
    active.quantity_in_stock = Set(99);
    active.update(ctx.db.as_ref()).await.unwrap();

    let response = ctx
        .services
        .stock
        .reconcile_stock(ctx.enterprise_id, prod.id)
        .await
        .unwrap();

    assert!(response.changed);
    assert_eq!(response.previous_quantity, 99);
    assert_eq!(response.corrected_quantity, 10);

    let fixed = ctx
        .services
        .products
        .get_product(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(fixed.quantity_in_stock, 10);
    assert_eq!(fixed.stock_status, StockStatus::InStock.as_str());
}

#[tokio::test]
async fn reconcile_is_a_no_op_when_projection_matches() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Verniz", 3000, 7).await;

    let response = ctx
        .services
        .stock
        .reconcile_stock(ctx.enterprise_id, prod.id)
        .await
        .unwrap();
    assert!(!response.changed);
    assert_eq!(response.corrected_quantity, 7);
}

#[tokio::test]
async fn stock_summary_counts_ledger_activity() {
    let ctx = common::setup().await;
    let prod = ctx.seed_product("Cola", 700, 8).await;

    ctx.services
        .stock
        .record_movement(
            ctx.enterprise_id,
            RecordMovementRequest {
                product_id: prod.id,
                movement_type: MovementType::Exit,
                quantity: 8,
                reason: "ajuste".to_string(),
            },
        )
        .await
        .unwrap();

    let summary = ctx
        .services
        .stock
        .stock_summary(ctx.enterprise_id, None, None)
        .await
        .unwrap();
    assert_eq!(summary.products_tracked, 1);
    assert_eq!(summary.units_in_stock, 0);
    assert_eq!(summary.products_out_of_stock, 1);
    assert_eq!(summary.entries_recorded, 1);
    assert_eq!(summary.exits_recorded, 1);
}

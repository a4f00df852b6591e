//! Every record is scoped to its owning enterprise. A record owned by
//! another tenant reads as not-found, never as forbidden, so existence
//! does not leak across tenants.

mod common;

use assert_matches::assert_matches;

use gestor_api::entities::stock_movement::MovementType;
use gestor_api::errors::ServiceError;
use gestor_api::services::sales::{CreateSaleRequest, SaleItemInput};
use gestor_api::services::stock::{MovementFilter, RecordMovementRequest};

#[tokio::test]
async fn products_are_invisible_across_tenants() {
    let owner = common::setup().await;
    let other = common::setup().await;
    let prod = owner.seed_product("Telha", 1200, 10).await;

    let err = other
        .services
        .products
        .get_product(other.enterprise_id, prod.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let err = other
        .services
        .stock
        .record_movement(
            other.enterprise_id,
            RecordMovementRequest {
                product_id: prod.id,
                movement_type: MovementType::Exit,
                quantity: 1,
                reason: "ajuste".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // The attempted cross-tenant exit must not have touched the stock.
    let untouched = owner
        .services
        .products
        .get_product(owner.enterprise_id, prod.id)
        .await
        .unwrap();
    assert_eq!(untouched.quantity_in_stock, 10);
}

#[tokio::test]
async fn sales_cannot_be_cancelled_by_another_tenant() {
    let owner = common::setup().await;
    let other = common::setup().await;
    let prod = owner.seed_product("Cimento", 4000, 10).await;

    let sale = owner
        .services
        .sales
        .create_sale(
            owner.enterprise_id,
            CreateSaleRequest {
                client_id: None,
                payment_method: "dinheiro".to_string(),
                notes: None,
                items: vec![SaleItemInput {
                    product_id: prod.id,
                    quantity: 2,
                }],
            },
        )
        .await
        .unwrap();

    let err = other
        .services
        .sales
        .cancel_sale(other.enterprise_id, sale.sale.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn listings_only_contain_the_tenants_own_rows() {
    let owner = common::setup().await;
    let other = common::setup().await;
    let prod = owner.seed_product("Areia", 900, 5).await;

    let own_page = owner
        .services
        .stock
        .list_movements(owner.enterprise_id, MovementFilter::default(), 1, 50)
        .await
        .unwrap();
    assert_eq!(own_page.total, 1); // the opening entry

    let foreign_page = other
        .services
        .stock
        .list_movements(other.enterprise_id, MovementFilter::default(), 1, 50)
        .await
        .unwrap();
    assert_eq!(foreign_page.total, 0);

    let products = other
        .services
        .products
        .list_products(other.enterprise_id, Default::default(), 1, 50)
        .await
        .unwrap();
    assert!(products.products.iter().all(|p| p.id != prod.id));
}

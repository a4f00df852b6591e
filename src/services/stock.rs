//! Stock ledger service.
//!
//! Every stock change goes through [`apply_movement`]: an atomic in-place
//! quantity update plus an immutable ledger row recording the before and
//! after quantities. `products.quantity_in_stock` is a projection of the
//! ledger; [`StockLedgerService::reconcile_stock`] rebuilds it from the log
//! when the two drift apart.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::product::{self, Entity as Product, StockStatus};
use crate::entities::stock_movement::{self, Entity as StockMovement, MovementType};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::StockPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct RecordMovementRequest {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovementResponse {
    pub movement: stock_movement::Model,
    pub product: product::Model,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileResponse {
    pub product_id: Uuid,
    pub previous_quantity: i32,
    pub corrected_quantity: i32,
    pub stock_status: String,
    /// False when the projection already matched the ledger.
    pub changed: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MovementPage {
    pub movements: Vec<stock_movement::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Aggregate view of ledger activity for the stock dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct StockSummary {
    pub products_tracked: u64,
    pub units_in_stock: i64,
    pub products_out_of_stock: u64,
    pub entries_recorded: u64,
    pub exits_recorded: u64,
}

/// Applies one movement inside the caller's transaction.
///
/// The quantity update is a single conditional UPDATE, so two concurrent
/// movements on the same product serialize at the database instead of
/// racing a read-modify-write. When the policy forbids negative stock, an
/// exit adds a `quantity_in_stock >= quantity` guard to the UPDATE and a
/// zero row count means the guard failed.
pub(crate) async fn apply_movement<C: ConnectionTrait>(
    conn: &C,
    policy: &StockPolicy,
    enterprise_id: Uuid,
    product_id: Uuid,
    movement_type: MovementType,
    quantity: i32,
    reason: &str,
) -> Result<(stock_movement::Model, product::Model), ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::ValidationError(
            "movement quantity must be a positive integer".to_string(),
        ));
    }

    let existing = Product::find_by_id(product_id)
        .filter(product::Column::EnterpriseId.eq(enterprise_id))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

    let delta = quantity * movement_type.signum();

    let mut update = Product::update_many()
        .col_expr(
            product::Column::QuantityInStock,
            Expr::col(product::Column::QuantityInStock).add(delta),
        )
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::EnterpriseId.eq(enterprise_id));

    let guarded = movement_type == MovementType::Exit && !policy.allow_negative_stock;
    if guarded {
        update = update.filter(product::Column::QuantityInStock.gte(quantity));
    }

    let result = update.exec(conn).await.map_err(ServiceError::db_error)?;
    if result.rows_affected == 0 {
        // With the stock guard attached, zero rows means the guard failed.
        // Without it, the product can only have been deleted by a concurrent
        // transaction after the read above.
        if guarded {
            return Err(ServiceError::InsufficientStock(format!(
                "Product '{}' has {} units in stock, cannot exit {}",
                existing.name, existing.quantity_in_stock, quantity
            )));
        }
        return Err(ServiceError::NotFound(format!(
            "Product {} not found",
            product_id
        )));
    }

    let updated = Product::find_by_id(product_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| {
            ServiceError::InternalError(format!("Product {} vanished mid-update", product_id))
        })?;

    let mut active: product::ActiveModel = updated.clone().into();
    active.stock_status = Set(StockStatus::for_quantity(updated.quantity_in_stock)
        .as_str()
        .to_string());
    active.updated_at = Set(Some(Utc::now()));
    let updated = active.update(conn).await.map_err(ServiceError::db_error)?;

    let movement = stock_movement::ActiveModel {
        id: Set(Uuid::new_v4()),
        enterprise_id: Set(enterprise_id),
        product_id: Set(product_id),
        movement_type: Set(movement_type.as_str().to_string()),
        quantity: Set(quantity),
        reason: Set(reason.to_string()),
        previous_quantity: Set(updated.quantity_in_stock - delta),
        new_quantity: Set(updated.quantity_in_stock),
        created_at: Set(Utc::now()),
    };
    let movement = movement.insert(conn).await.map_err(ServiceError::db_error)?;

    Ok((movement, updated))
}

#[derive(Clone)]
pub struct StockLedgerService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    policy: StockPolicy,
}

impl StockLedgerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, policy: StockPolicy) -> Self {
        Self {
            db_pool,
            event_sender,
            policy,
        }
    }

    /// Records one manual movement and returns the ledger row together with
    /// the updated product.
    #[instrument(skip(self), fields(enterprise_id = %enterprise_id))]
    pub async fn record_movement(
        &self,
        enterprise_id: Uuid,
        request: RecordMovementRequest,
    ) -> Result<MovementResponse, ServiceError> {
        if request.reason.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "movement reason must not be empty".to_string(),
            ));
        }

        let policy = self.policy;
        let (movement, product) = self
            .db_pool
            .transaction::<_, (stock_movement::Model, product::Model), ServiceError>(|txn| {
                Box::pin(async move {
                    apply_movement(
                        txn,
                        &policy,
                        enterprise_id,
                        request.product_id,
                        request.movement_type,
                        request.quantity,
                        &request.reason,
                    )
                    .await
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            product_id = %product.id,
            movement_type = %movement.movement_type,
            quantity = movement.quantity,
            new_quantity = movement.new_quantity,
            "stock movement recorded"
        );

        self.event_sender
            .send(Event::StockMovementRecorded {
                enterprise_id,
                product_id: product.id,
                movement_type: movement.movement_type.clone(),
                quantity: movement.quantity,
                new_quantity: movement.new_quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(MovementResponse { movement, product })
    }

    /// Rebuilds a product's stock quantity from its full movement log.
    ///
    /// The corrected quantity is the sum of entries minus exits; the stored
    /// projection is overwritten even when negative.
    #[instrument(skip(self), fields(enterprise_id = %enterprise_id))]
    pub async fn reconcile_stock(
        &self,
        enterprise_id: Uuid,
        product_id: Uuid,
    ) -> Result<ReconcileResponse, ServiceError> {
        let response = self
            .db_pool
            .transaction::<_, ReconcileResponse, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = Product::find_by_id(product_id)
                        .filter(product::Column::EnterpriseId.eq(enterprise_id))
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Product {} not found", product_id))
                        })?;

                    let movements = StockMovement::find()
                        .filter(stock_movement::Column::EnterpriseId.eq(enterprise_id))
                        .filter(stock_movement::Column::ProductId.eq(product_id))
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    let corrected: i32 = movements
                        .iter()
                        .filter_map(|m| {
                            MovementType::from_str(&m.movement_type)
                                .map(|t| m.quantity * t.signum())
                        })
                        .sum();

                    let previous = existing.quantity_in_stock;
                    if corrected != previous {
                        let mut active: product::ActiveModel = existing.into();
                        active.quantity_in_stock = Set(corrected);
                        active.stock_status = Set(StockStatus::for_quantity(corrected)
                            .as_str()
                            .to_string());
                        active.updated_at = Set(Some(Utc::now()));
                        active.update(txn).await.map_err(ServiceError::db_error)?;
                    }

                    Ok(ReconcileResponse {
                        product_id,
                        previous_quantity: previous,
                        corrected_quantity: corrected,
                        stock_status: StockStatus::for_quantity(corrected).as_str().to_string(),
                        changed: corrected != previous,
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        if response.changed {
            info!(
                product_id = %product_id,
                previous = response.previous_quantity,
                corrected = response.corrected_quantity,
                "stock projection reconciled from ledger"
            );
            self.event_sender
                .send(Event::StockReconciled {
                    enterprise_id,
                    product_id,
                    corrected_quantity: response.corrected_quantity,
                })
                .await
                .map_err(ServiceError::EventError)?;
        }

        Ok(response)
    }

    /// Lists ledger rows newest-first, optionally filtered by product,
    /// direction and time window.
    pub async fn list_movements(
        &self,
        enterprise_id: Uuid,
        filter: MovementFilter,
        page: u64,
        per_page: u64,
    ) -> Result<MovementPage, ServiceError> {
        let per_page = per_page.clamp(1, 200);
        let page = page.max(1);

        let mut query = StockMovement::find()
            .filter(stock_movement::Column::EnterpriseId.eq(enterprise_id));

        if let Some(product_id) = filter.product_id {
            query = query.filter(stock_movement::Column::ProductId.eq(product_id));
        }
        if let Some(movement_type) = filter.movement_type {
            query = query.filter(stock_movement::Column::MovementType.eq(movement_type.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(stock_movement::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(stock_movement::Column::CreatedAt.lte(to));
        }

        let paginator = query
            .order_by_desc(stock_movement::Column::CreatedAt)
            .paginate(self.db_pool.as_ref(), per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let movements = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(MovementPage {
            movements,
            total,
            page,
            per_page,
        })
    }

    /// Aggregate counters for the stock dashboard. The optional window
    /// bounds the movement counts; the stock totals are always current.
    pub async fn stock_summary(
        &self,
        enterprise_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<StockSummary, ServiceError> {
        let products = Product::find()
            .filter(product::Column::EnterpriseId.eq(enterprise_id))
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let mut movements = StockMovement::find()
            .filter(stock_movement::Column::EnterpriseId.eq(enterprise_id));
        if let Some(from) = from {
            movements = movements.filter(stock_movement::Column::CreatedAt.gte(from));
        }
        if let Some(to) = to {
            movements = movements.filter(stock_movement::Column::CreatedAt.lte(to));
        }

        let entries_recorded = movements
            .clone()
            .filter(stock_movement::Column::MovementType.eq(MovementType::Entry.as_str()))
            .count(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let exits_recorded = movements
            .filter(stock_movement::Column::MovementType.eq(MovementType::Exit.as_str()))
            .count(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        Ok(StockSummary {
            products_tracked: products.len() as u64,
            units_in_stock: products
                .iter()
                .map(|p| i64::from(p.quantity_in_stock))
                .sum(),
            products_out_of_stock: products
                .iter()
                .filter(|p| p.quantity_in_stock <= 0)
                .count() as u64,
            entries_recorded,
            exits_recorded,
        })
    }
}

//! Sale lifecycle service.
//!
//! Creating a sale debits stock through the ledger; cancelling it credits
//! the same quantities back with compensating entry movements. Both run in
//! a single transaction so the sale row and its ledger effects commit or
//! roll back together.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::client::{self, Entity as Client};
use crate::entities::product::{self, Entity as Product};
use crate::entities::sale::{self, Entity as Sale, SaleStatus};
use crate::entities::sale_item::{self, Entity as SaleItem};
use crate::entities::stock_movement::MovementType;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::stock::apply_movement;
use crate::services::StockPolicy;

const SALE_REASON: &str = "venda";
const CANCELLATION_REASON: &str = "cancelamento de venda";

#[derive(Debug, Clone, Deserialize)]
pub struct SaleItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSaleRequest {
    pub client_id: Option<Uuid>,
    pub payment_method: String,
    pub notes: Option<String>,
    pub items: Vec<SaleItemInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaleResponse {
    #[serde(flatten)]
    pub sale: sale::Model,
    pub items: Vec<sale_item::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalePage {
    pub sales: Vec<sale::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct SaleService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    policy: StockPolicy,
}

impl SaleService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, policy: StockPolicy) -> Self {
        Self {
            db_pool,
            event_sender,
            policy,
        }
    }

    /// Creates a completed sale, debiting stock for every line item.
    ///
    /// Line totals and the sale total are computed server-side from the
    /// product's current sale price; any client-supplied amounts are
    /// ignored. Failure on any line (unknown product, or insufficient stock
    /// under a strict policy) rolls back the whole sale.
    #[instrument(skip(self, request), fields(enterprise_id = %enterprise_id))]
    pub async fn create_sale(
        &self,
        enterprise_id: Uuid,
        request: CreateSaleRequest,
    ) -> Result<SaleResponse, ServiceError> {
        if request.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "a sale must contain at least one item".to_string(),
            ));
        }
        if request.payment_method.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "payment method must not be empty".to_string(),
            ));
        }
        if request.items.iter().any(|i| i.quantity <= 0) {
            return Err(ServiceError::ValidationError(
                "item quantities must be positive integers".to_string(),
            ));
        }

        let policy = self.policy;
        let response = self
            .db_pool
            .transaction::<_, SaleResponse, ServiceError>(|txn| {
                Box::pin(async move {
                    if let Some(client_id) = request.client_id {
                        Client::find_by_id(client_id)
                            .filter(client::Column::EnterpriseId.eq(enterprise_id))
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!("Client {} not found", client_id))
                            })?;
                    }

                    let sale_id = Uuid::new_v4();
                    let mut total_cents: i64 = 0;
                    let mut item_rows = Vec::with_capacity(request.items.len());

                    for item in &request.items {
                        let product = Product::find_by_id(item.product_id)
                            .filter(product::Column::EnterpriseId.eq(enterprise_id))
                            .one(txn)
                            .await
                            .map_err(ServiceError::db_error)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Product {} not found",
                                    item.product_id
                                ))
                            })?;

                        apply_movement(
                            txn,
                            &policy,
                            enterprise_id,
                            item.product_id,
                            MovementType::Exit,
                            item.quantity,
                            SALE_REASON,
                        )
                        .await?;

                        let line_total = product.sale_price_cents * i64::from(item.quantity);
                        total_cents += line_total;

                        item_rows.push(sale_item::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            sale_id: Set(sale_id),
                            product_id: Set(product.id),
                            product_name: Set(product.name),
                            quantity: Set(item.quantity),
                            unit_price_cents: Set(product.sale_price_cents),
                            total_cents: Set(line_total),
                        });
                    }

                    let sale = sale::ActiveModel {
                        id: Set(sale_id),
                        enterprise_id: Set(enterprise_id),
                        client_id: Set(request.client_id),
                        total_cents: Set(total_cents),
                        payment_method: Set(request.payment_method.clone()),
                        status: Set(SaleStatus::Completed.as_str().to_string()),
                        notes: Set(request.notes.clone()),
                        created_at: Set(Utc::now()),
                        updated_at: Set(None),
                    };
                    let sale = sale.insert(txn).await.map_err(ServiceError::db_error)?;

                    let mut items = Vec::with_capacity(item_rows.len());
                    for row in item_rows {
                        items.push(row.insert(txn).await.map_err(ServiceError::db_error)?);
                    }

                    Ok(SaleResponse { sale, items })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            sale_id = %response.sale.id,
            total_cents = response.sale.total_cents,
            items = response.items.len(),
            "sale created"
        );

        self.event_sender
            .send(Event::SaleCreated {
                enterprise_id,
                sale_id: response.sale.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(response)
    }

    /// Cancels a sale and restores the stock it debited.
    ///
    /// One compensating entry movement is written per line item, in the same
    /// transaction as the status flip. Cancelling an already cancelled sale
    /// is rejected; a line whose product no longer exists makes the whole
    /// cancellation fail as a dependency failure and rolls everything back.
    #[instrument(skip(self), fields(enterprise_id = %enterprise_id))]
    pub async fn cancel_sale(
        &self,
        enterprise_id: Uuid,
        sale_id: Uuid,
    ) -> Result<SaleResponse, ServiceError> {
        let policy = self.policy;
        let response = self
            .db_pool
            .transaction::<_, SaleResponse, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = Sale::find_by_id(sale_id)
                        .filter(sale::Column::EnterpriseId.eq(enterprise_id))
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Sale {} not found", sale_id))
                        })?;

                    if existing.status == SaleStatus::Cancelled.as_str() {
                        return Err(ServiceError::InvalidState(format!(
                            "Sale {} is already cancelled",
                            sale_id
                        )));
                    }

                    let items = SaleItem::find()
                        .filter(sale_item::Column::SaleId.eq(sale_id))
                        .all(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    for item in &items {
                        apply_movement(
                            txn,
                            &policy,
                            enterprise_id,
                            item.product_id,
                            MovementType::Entry,
                            item.quantity,
                            CANCELLATION_REASON,
                        )
                        .await
                        .map_err(|e| match e {
                            ServiceError::NotFound(_) => ServiceError::DependencyFailure(format!(
                                "Cannot restore stock for sale {}: product {} no longer exists",
                                sale_id, item.product_id
                            )),
                            other => other,
                        })?;
                    }

                    let mut active: sale::ActiveModel = existing.into();
                    active.status = Set(SaleStatus::Cancelled.as_str().to_string());
                    active.updated_at = Set(Some(Utc::now()));
                    let sale = active.update(txn).await.map_err(ServiceError::db_error)?;

                    Ok(SaleResponse { sale, items })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(sale_id = %sale_id, "sale cancelled, stock restored");

        self.event_sender
            .send(Event::SaleCancelled {
                enterprise_id,
                sale_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(response)
    }

    /// Deletes a cancelled sale and its items. The ledger rows the sale
    /// produced are audit history and are never removed.
    #[instrument(skip(self), fields(enterprise_id = %enterprise_id))]
    pub async fn delete_sale(
        &self,
        enterprise_id: Uuid,
        sale_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.db_pool
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = Sale::find_by_id(sale_id)
                        .filter(sale::Column::EnterpriseId.eq(enterprise_id))
                        .one(txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Sale {} not found", sale_id))
                        })?;

                    if existing.status != SaleStatus::Cancelled.as_str() {
                        return Err(ServiceError::InvalidState(format!(
                            "Sale {} must be cancelled before deletion",
                            sale_id
                        )));
                    }

                    SaleItem::delete_many()
                        .filter(sale_item::Column::SaleId.eq(sale_id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    Sale::delete_by_id(sale_id)
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;

                    Ok(())
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(sale_id = %sale_id, "cancelled sale deleted");

        self.event_sender
            .send(Event::SaleDeleted {
                enterprise_id,
                sale_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }

    pub async fn get_sale(
        &self,
        enterprise_id: Uuid,
        sale_id: Uuid,
    ) -> Result<SaleResponse, ServiceError> {
        let sale = Sale::find_by_id(sale_id)
            .filter(sale::Column::EnterpriseId.eq(enterprise_id))
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Sale {} not found", sale_id)))?;

        let items = SaleItem::find()
            .filter(sale_item::Column::SaleId.eq(sale_id))
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        Ok(SaleResponse { sale, items })
    }

    /// Lists sales newest-first, optionally filtered by status.
    pub async fn list_sales(
        &self,
        enterprise_id: Uuid,
        status: Option<SaleStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<SalePage, ServiceError> {
        let per_page = per_page.clamp(1, 200);
        let page = page.max(1);

        let mut query = Sale::find().filter(sale::Column::EnterpriseId.eq(enterprise_id));
        if let Some(status) = status {
            query = query.filter(sale::Column::Status.eq(status.as_str()));
        }

        let paginator = query
            .order_by_desc(sale::Column::CreatedAt)
            .paginate(self.db_pool.as_ref(), per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let sales = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(SalePage {
            sales,
            total,
            page,
            per_page,
        })
    }
}

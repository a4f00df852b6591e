//! Budget (price quote) service.
//!
//! Budgets never touch the stock ledger. A budget is created from checkout
//! with nothing more than a name and phone for the client; the client row
//! is resolved or created by phone so repeated quotes from the same person
//! reuse one record. Totals are always recomputed from the item rows.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::budget::{self, Entity as Budget, BudgetStatus};
use crate::entities::budget_item::{self, Entity as BudgetItem};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::clients::find_or_create_by_phone;

/// Default validity window for a new budget.
const DEFAULT_VALIDITY_DAYS: i64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct BudgetItemInput {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertBudgetRequest {
    /// Present on update, absent on create.
    pub id: Option<Uuid>,
    pub client_name: String,
    pub client_phone: String,
    /// On create, absence defaults to thirty days out. On update, absence
    /// keeps the stored deadline.
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub items: Vec<BudgetItemInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetResponse {
    #[serde(flatten)]
    pub budget: budget::Model,
    pub items: Vec<budget_item::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetPage {
    pub budgets: Vec<budget::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct BudgetService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl BudgetService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates or fully replaces a budget.
    ///
    /// On create the client is resolved by phone (created when absent), the
    /// status starts at `offered` and `valid_until` defaults to thirty days
    /// out. On update the item rows are replaced wholesale and the total
    /// recomputed; the stored status is preserved.
    #[instrument(skip(self, request), fields(enterprise_id = %enterprise_id))]
    pub async fn upsert_budget(
        &self,
        enterprise_id: Uuid,
        request: UpsertBudgetRequest,
    ) -> Result<BudgetResponse, ServiceError> {
        if request.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "a budget must contain at least one item".to_string(),
            ));
        }
        if request.client_name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "client name must not be empty".to_string(),
            ));
        }
        if request
            .items
            .iter()
            .any(|i| i.quantity <= 0 || i.unit_price_cents < 0)
        {
            return Err(ServiceError::ValidationError(
                "item quantities must be positive and prices non-negative".to_string(),
            ));
        }

        let is_update = request.id.is_some();
        let response = self
            .db_pool
            .transaction::<_, BudgetResponse, ServiceError>(|txn| {
                Box::pin(async move {
                    let total_cents: i64 = request
                        .items
                        .iter()
                        .map(|i| i.unit_price_cents * i64::from(i.quantity))
                        .sum();

                    let client = find_or_create_by_phone(
                        txn,
                        enterprise_id,
                        &request.client_name,
                        &request.client_phone,
                    )
                    .await?;

                    let budget = match request.id {
                        Some(budget_id) => {
                            let existing = Budget::find_by_id(budget_id)
                                .filter(budget::Column::EnterpriseId.eq(enterprise_id))
                                .one(txn)
                                .await
                                .map_err(ServiceError::db_error)?
                                .ok_or_else(|| {
                                    ServiceError::NotFound(format!(
                                        "Budget {} not found",
                                        budget_id
                                    ))
                                })?;

                            BudgetItem::delete_many()
                                .filter(budget_item::Column::BudgetId.eq(budget_id))
                                .exec(txn)
                                .await
                                .map_err(ServiceError::db_error)?;

                            let mut active: budget::ActiveModel = existing.into();
                            active.client_id = Set(client.id);
                            active.total_cents = Set(total_cents);
                            if let Some(valid_until) = request.valid_until {
                                active.valid_until = Set(valid_until);
                            }
                            active.notes = Set(request.notes.clone());
                            active.updated_at = Set(Some(Utc::now()));
                            active.update(txn).await.map_err(ServiceError::db_error)?
                        }
                        None => {
                            let model = budget::ActiveModel {
                                id: Set(Uuid::new_v4()),
                                enterprise_id: Set(enterprise_id),
                                client_id: Set(client.id),
                                total_cents: Set(total_cents),
                                valid_until: Set(request.valid_until.unwrap_or_else(|| {
                                    Utc::now() + Duration::days(DEFAULT_VALIDITY_DAYS)
                                })),
                                status: Set(BudgetStatus::Offered.as_str().to_string()),
                                notes: Set(request.notes.clone()),
                                created_at: Set(Utc::now()),
                                updated_at: Set(None),
                            };
                            model.insert(txn).await.map_err(ServiceError::db_error)?
                        }
                    };

                    let mut items = Vec::with_capacity(request.items.len());
                    for input in &request.items {
                        let row = budget_item::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            budget_id: Set(budget.id),
                            product_id: Set(input.product_id),
                            product_name: Set(input.product_name.clone()),
                            quantity: Set(input.quantity),
                            unit_price_cents: Set(input.unit_price_cents),
                            total_cents: Set(input.unit_price_cents * i64::from(input.quantity)),
                        };
                        items.push(row.insert(txn).await.map_err(ServiceError::db_error)?);
                    }

                    Ok(BudgetResponse { budget, items })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            budget_id = %response.budget.id,
            total_cents = response.budget.total_cents,
            "budget saved"
        );

        let event = if is_update {
            Event::BudgetUpdated {
                enterprise_id,
                budget_id: response.budget.id,
            }
        } else {
            Event::BudgetCreated {
                enterprise_id,
                budget_id: response.budget.id,
            }
        };
        self.event_sender
            .send(event)
            .await
            .map_err(ServiceError::EventError)?;

        Ok(response)
    }

    /// Moves a budget to a new lifecycle state. Any transition between the
    /// known states is allowed; acceptance does not create a sale.
    #[instrument(skip(self), fields(enterprise_id = %enterprise_id))]
    pub async fn update_budget_status(
        &self,
        enterprise_id: Uuid,
        budget_id: Uuid,
        status: BudgetStatus,
    ) -> Result<budget::Model, ServiceError> {
        let existing = self.find_scoped(budget_id, enterprise_id).await?;
        let old_status = existing.status.clone();

        let mut active: budget::ActiveModel = existing.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Some(Utc::now()));
        let updated = active
            .update(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::BudgetStatusChanged {
                enterprise_id,
                budget_id,
                old_status,
                new_status: status.as_str().to_string(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Deletes a budget and its items regardless of status. Budgets hold no
    /// stock, so there is nothing to compensate.
    #[instrument(skip(self), fields(enterprise_id = %enterprise_id))]
    pub async fn delete_budget(
        &self,
        enterprise_id: Uuid,
        budget_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.find_scoped(budget_id, enterprise_id).await?;

        self.db_pool
            .transaction::<_, (), ServiceError>(|txn| {
                Box::pin(async move {
                    BudgetItem::delete_many()
                        .filter(budget_item::Column::BudgetId.eq(budget_id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::db_error)?;
                    Budget::delete_by_id(budget_id)
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

        self.event_sender
            .send(Event::BudgetDeleted {
                enterprise_id,
                budget_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }

    pub async fn get_budget(
        &self,
        enterprise_id: Uuid,
        budget_id: Uuid,
    ) -> Result<BudgetResponse, ServiceError> {
        let budget = self.find_scoped(budget_id, enterprise_id).await?;
        let items = BudgetItem::find()
            .filter(budget_item::Column::BudgetId.eq(budget_id))
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        Ok(BudgetResponse { budget, items })
    }

    pub async fn list_budgets(
        &self,
        enterprise_id: Uuid,
        status: Option<BudgetStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<BudgetPage, ServiceError> {
        let per_page = per_page.clamp(1, 200);
        let page = page.max(1);

        let mut query = Budget::find().filter(budget::Column::EnterpriseId.eq(enterprise_id));
        if let Some(status) = status {
            query = query.filter(budget::Column::Status.eq(status.as_str()));
        }

        let paginator = query
            .order_by_desc(budget::Column::CreatedAt)
            .paginate(self.db_pool.as_ref(), per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let budgets = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(BudgetPage {
            budgets,
            total,
            page,
            per_page,
        })
    }

    async fn find_scoped(
        &self,
        budget_id: Uuid,
        enterprise_id: Uuid,
    ) -> Result<budget::Model, ServiceError> {
        Budget::find_by_id(budget_id)
            .filter(budget::Column::EnterpriseId.eq(enterprise_id))
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Budget {} not found", budget_id)))
    }
}

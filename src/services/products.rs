//! Product catalog service.
//!
//! Catalog writes never touch `quantity_in_stock` directly: an initial
//! quantity on creation is booked as an entry movement, and later changes
//! go through the stock ledger service.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::product::{self, Entity as Product, StockStatus};
use crate::entities::stock_movement::MovementType;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::stock::apply_movement;
use crate::services::StockPolicy;

const INITIAL_STOCK_REASON: &str = "estoque inicial";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub category: Option<String>,
    #[validate(range(min = 0, message = "purchase price must be non-negative"))]
    pub purchase_price_cents: i64,
    #[validate(range(min = 0, message = "sale price must be non-negative"))]
    pub sale_price_cents: i64,
    /// Booked as an opening entry movement when positive.
    pub initial_quantity: Option<i32>,
    #[serde(default)]
    pub publish_for_sale: bool,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub purchase_price_cents: Option<i64>,
    pub sale_price_cents: Option<i64>,
    pub publish_for_sale: Option<bool>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    pub category: Option<String>,
    /// Restrict to products published on the storefront.
    #[serde(default)]
    pub published_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<product::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    policy: StockPolicy,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, policy: StockPolicy) -> Self {
        Self {
            db_pool,
            event_sender,
            policy,
        }
    }

    #[instrument(skip(self, request), fields(enterprise_id = %enterprise_id))]
    pub async fn create_product(
        &self,
        enterprise_id: Uuid,
        request: CreateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;
        if matches!(request.initial_quantity, Some(q) if q < 0) {
            return Err(ServiceError::ValidationError(
                "initial quantity must be non-negative".to_string(),
            ));
        }

        let policy = self.policy;
        let created = self
            .db_pool
            .transaction::<_, product::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let model = product::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        enterprise_id: Set(enterprise_id),
                        name: Set(request.name.trim().to_string()),
                        category: Set(request.category.clone()),
                        purchase_price_cents: Set(request.purchase_price_cents),
                        sale_price_cents: Set(request.sale_price_cents),
                        quantity_in_stock: Set(0),
                        stock_status: Set(StockStatus::OutOfStock.as_str().to_string()),
                        publish_for_sale: Set(request.publish_for_sale),
                        image_url: Set(request.image_url.clone()),
                        created_at: Set(Utc::now()),
                        updated_at: Set(None),
                    };
                    let created = model.insert(txn).await.map_err(ServiceError::db_error)?;

                    match request.initial_quantity {
                        Some(quantity) if quantity > 0 => {
                            let (_, updated) = apply_movement(
                                txn,
                                &policy,
                                enterprise_id,
                                created.id,
                                MovementType::Entry,
                                quantity,
                                INITIAL_STOCK_REASON,
                            )
                            .await?;
                            Ok(updated)
                        }
                        _ => Ok(created),
                    }
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(product_id = %created.id, "product created");
        self.event_sender
            .send(Event::ProductCreated {
                enterprise_id,
                product_id: created.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    /// Updates catalog fields. Stock fields are owned by the ledger and are
    /// never writable here.
    #[instrument(skip(self, request), fields(enterprise_id = %enterprise_id))]
    pub async fn update_product(
        &self,
        enterprise_id: Uuid,
        product_id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        let existing = self.get_product(enterprise_id, product_id).await?;

        if matches!(request.purchase_price_cents, Some(p) if p < 0)
            || matches!(request.sale_price_cents, Some(p) if p < 0)
        {
            return Err(ServiceError::ValidationError(
                "prices must be non-negative".to_string(),
            ));
        }

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "name must not be empty".to_string(),
                ));
            }
            active.name = Set(name.trim().to_string());
        }
        if let Some(category) = request.category {
            active.category = Set(Some(category));
        }
        if let Some(price) = request.purchase_price_cents {
            active.purchase_price_cents = Set(price);
        }
        if let Some(price) = request.sale_price_cents {
            active.sale_price_cents = Set(price);
        }
        if let Some(publish) = request.publish_for_sale {
            active.publish_for_sale = Set(publish);
        }
        if let Some(image_url) = request.image_url {
            active.image_url = Set(Some(image_url));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ProductUpdated {
                enterprise_id,
                product_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Removes a product from the catalog. Its ledger rows stay behind as
    /// audit history.
    #[instrument(skip(self), fields(enterprise_id = %enterprise_id))]
    pub async fn delete_product(
        &self,
        enterprise_id: Uuid,
        product_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.get_product(enterprise_id, product_id).await?;

        Product::delete_by_id(product_id)
            .exec(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        info!(product_id = %product_id, "product deleted");
        self.event_sender
            .send(Event::ProductDeleted {
                enterprise_id,
                product_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }

    pub async fn get_product(
        &self,
        enterprise_id: Uuid,
        product_id: Uuid,
    ) -> Result<product::Model, ServiceError> {
        Product::find_by_id(product_id)
            .filter(product::Column::EnterpriseId.eq(enterprise_id))
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    pub async fn list_products(
        &self,
        enterprise_id: Uuid,
        filter: ProductFilter,
        page: u64,
        per_page: u64,
    ) -> Result<ProductPage, ServiceError> {
        let per_page = per_page.clamp(1, 200);
        let page = page.max(1);

        let mut query = Product::find().filter(product::Column::EnterpriseId.eq(enterprise_id));

        if let Some(search) = filter.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                let pattern = format!("%{}%", search.to_lowercase());
                query = query.filter(
                    sea_orm::sea_query::Expr::expr(sea_orm::sea_query::Func::lower(
                        sea_orm::sea_query::Expr::col(product::Column::Name),
                    ))
                    .like(pattern),
                );
            }
        }
        if let Some(category) = filter.category {
            query = query.filter(product::Column::Category.eq(category));
        }
        if filter.published_only {
            query = query.filter(product::Column::PublishForSale.eq(true));
        }

        let paginator = query
            .order_by_asc(product::Column::Name)
            .paginate(self.db_pool.as_ref(), per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let products = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(ProductPage {
            products,
            total,
            page,
            per_page,
        })
    }

    /// Distinct category names in use, for the catalog filter dropdown.
    pub async fn list_categories(&self, enterprise_id: Uuid) -> Result<Vec<String>, ServiceError> {
        let categories: Vec<Option<String>> = Product::find()
            .select_only()
            .column(product::Column::Category)
            .distinct()
            .filter(product::Column::EnterpriseId.eq(enterprise_id))
            .into_tuple()
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let mut categories: Vec<String> = categories
            .into_iter()
            .flatten()
            .filter(|c| !c.trim().is_empty())
            .collect();
        categories.sort();
        Ok(categories)
    }
}

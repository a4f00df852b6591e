//! Supplier directory service.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::supplier::{self, Entity as Supplier};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierPage {
    pub suppliers: Vec<supplier::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct SupplierService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SupplierService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(enterprise_id = %enterprise_id))]
    pub async fn create_supplier(
        &self,
        enterprise_id: Uuid,
        request: CreateSupplierRequest,
    ) -> Result<supplier::Model, ServiceError> {
        request.validate()?;

        let model = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            enterprise_id: Set(enterprise_id),
            name: Set(request.name.trim().to_string()),
            contact_name: Set(request.contact_name),
            phone: Set(request.phone),
            email: Set(request.email),
            category: Set(request.category),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = model
            .insert(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        info!(supplier_id = %created.id, "supplier created");
        self.event_sender
            .send(Event::SupplierCreated {
                enterprise_id,
                supplier_id: created.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    #[instrument(skip(self, request), fields(enterprise_id = %enterprise_id))]
    pub async fn update_supplier(
        &self,
        enterprise_id: Uuid,
        supplier_id: Uuid,
        request: UpdateSupplierRequest,
    ) -> Result<supplier::Model, ServiceError> {
        let existing = self.get_supplier(enterprise_id, supplier_id).await?;

        let mut active: supplier::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(contact_name) = request.contact_name {
            active.contact_name = Set(Some(contact_name));
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(email) = request.email {
            active.email = Set(Some(email));
        }
        if let Some(category) = request.category {
            active.category = Set(Some(category));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::SupplierUpdated {
                enterprise_id,
                supplier_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    #[instrument(skip(self), fields(enterprise_id = %enterprise_id))]
    pub async fn delete_supplier(
        &self,
        enterprise_id: Uuid,
        supplier_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.get_supplier(enterprise_id, supplier_id).await?;

        Supplier::delete_by_id(supplier_id)
            .exec(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::SupplierDeleted {
                enterprise_id,
                supplier_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }

    pub async fn get_supplier(
        &self,
        enterprise_id: Uuid,
        supplier_id: Uuid,
    ) -> Result<supplier::Model, ServiceError> {
        Supplier::find_by_id(supplier_id)
            .filter(supplier::Column::EnterpriseId.eq(enterprise_id))
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier {} not found", supplier_id)))
    }

    pub async fn list_suppliers(
        &self,
        enterprise_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<SupplierPage, ServiceError> {
        let per_page = per_page.clamp(1, 200);
        let page = page.max(1);

        let paginator = Supplier::find()
            .filter(supplier::Column::EnterpriseId.eq(enterprise_id))
            .order_by_asc(supplier::Column::Name)
            .paginate(self.db_pool.as_ref(), per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let suppliers = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(SupplierPage {
            suppliers,
            total,
            page,
            per_page,
        })
    }
}

//! Tenant profile service.
//!
//! An enterprise row is the tenant boundary; callers only ever reach the
//! enterprise their token names, so every operation here takes the id from
//! the authenticated context, never from the request body.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::enterprise::{self, Entity as Enterprise};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEnterpriseRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub legal_name: Option<String>,
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEnterpriseRequest {
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub document: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Clone)]
pub struct EnterpriseService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl EnterpriseService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Provisions a new tenant. Used at onboarding, outside the
    /// tenant-scoped routes.
    #[instrument(skip(self, request))]
    pub async fn create_enterprise(
        &self,
        request: CreateEnterpriseRequest,
    ) -> Result<enterprise::Model, ServiceError> {
        request.validate()?;

        let model = enterprise::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            legal_name: Set(request.legal_name),
            document: Set(request.document),
            email: Set(request.email),
            phone: Set(request.phone),
            address: Set(request.address),
            logo_url: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = model
            .insert(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        info!(enterprise_id = %created.id, "enterprise provisioned");
        Ok(created)
    }

    pub async fn get_profile(
        &self,
        enterprise_id: Uuid,
    ) -> Result<enterprise::Model, ServiceError> {
        Enterprise::find_by_id(enterprise_id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Enterprise {} not found", enterprise_id))
            })
    }

    #[instrument(skip(self, request), fields(enterprise_id = %enterprise_id))]
    pub async fn update_profile(
        &self,
        enterprise_id: Uuid,
        request: UpdateEnterpriseRequest,
    ) -> Result<enterprise::Model, ServiceError> {
        let existing = self.get_profile(enterprise_id).await?;

        let mut active: enterprise::ActiveModel = existing.into();
        if let Some(name) = request.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "name must not be empty".to_string(),
                ));
            }
            active.name = Set(name.trim().to_string());
        }
        if let Some(legal_name) = request.legal_name {
            active.legal_name = Set(Some(legal_name));
        }
        if let Some(document) = request.document {
            active.document = Set(Some(document));
        }
        if let Some(email) = request.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        if let Some(logo_url) = request.logo_url {
            active.logo_url = Set(Some(logo_url));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::EnterpriseUpdated { enterprise_id })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }
}

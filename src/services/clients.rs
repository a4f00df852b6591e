//! Client directory service.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::client::{self, Entity as Client};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientPage {
    pub clients: Vec<client::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Resolves a client by phone within a tenant, creating one when absent.
///
/// The phone number is the idempotent key: repeated checkouts from the same
/// phone reuse one client row instead of minting duplicates.
pub(crate) async fn find_or_create_by_phone<C: ConnectionTrait>(
    conn: &C,
    enterprise_id: Uuid,
    name: &str,
    phone: &str,
) -> Result<client::Model, ServiceError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(ServiceError::ValidationError(
            "client phone must not be empty".to_string(),
        ));
    }

    if let Some(existing) = Client::find()
        .filter(client::Column::EnterpriseId.eq(enterprise_id))
        .filter(client::Column::Phone.eq(phone))
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
    {
        return Ok(existing);
    }

    let model = client::ActiveModel {
        id: Set(Uuid::new_v4()),
        enterprise_id: Set(enterprise_id),
        name: Set(name.trim().to_string()),
        phone: Set(phone.to_string()),
        email: Set(None),
        address: Set(None),
        created_at: Set(Utc::now()),
        updated_at: Set(None),
    };
    model.insert(conn).await.map_err(ServiceError::db_error)
}

#[derive(Clone)]
pub struct ClientService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ClientService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(enterprise_id = %enterprise_id))]
    pub async fn create_client(
        &self,
        enterprise_id: Uuid,
        request: CreateClientRequest,
    ) -> Result<client::Model, ServiceError> {
        request.validate()?;

        let existing = Client::find()
            .filter(client::Column::EnterpriseId.eq(enterprise_id))
            .filter(client::Column::Phone.eq(request.phone.trim()))
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A client with phone {} already exists",
                request.phone.trim()
            )));
        }

        let model = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            enterprise_id: Set(enterprise_id),
            name: Set(request.name.trim().to_string()),
            phone: Set(request.phone.trim().to_string()),
            email: Set(request.email),
            address: Set(request.address),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        let created = model
            .insert(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        info!(client_id = %created.id, "client created");
        self.event_sender
            .send(Event::ClientCreated {
                enterprise_id,
                client_id: created.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(created)
    }

    #[instrument(skip(self, request), fields(enterprise_id = %enterprise_id))]
    pub async fn update_client(
        &self,
        enterprise_id: Uuid,
        client_id: Uuid,
        request: UpdateClientRequest,
    ) -> Result<client::Model, ServiceError> {
        let existing = self.get_client(enterprise_id, client_id).await?;

        let mut active: client::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(phone) = request.phone {
            active.phone = Set(phone.trim().to_string());
        }
        if let Some(email) = request.email {
            active.email = Set(Some(email));
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active
            .update(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ClientUpdated {
                enterprise_id,
                client_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    #[instrument(skip(self), fields(enterprise_id = %enterprise_id))]
    pub async fn delete_client(
        &self,
        enterprise_id: Uuid,
        client_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.get_client(enterprise_id, client_id).await?;

        Client::delete_by_id(client_id)
            .exec(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        self.event_sender
            .send(Event::ClientDeleted {
                enterprise_id,
                client_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }

    pub async fn get_client(
        &self,
        enterprise_id: Uuid,
        client_id: Uuid,
    ) -> Result<client::Model, ServiceError> {
        Client::find_by_id(client_id)
            .filter(client::Column::EnterpriseId.eq(enterprise_id))
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", client_id)))
    }

    pub async fn list_clients(
        &self,
        enterprise_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<ClientPage, ServiceError> {
        let per_page = per_page.clamp(1, 200);
        let page = page.max(1);

        let paginator = Client::find()
            .filter(client::Column::EnterpriseId.eq(enterprise_id))
            .order_by_asc(client::Column::Name)
            .paginate(self.db_pool.as_ref(), per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::db_error)?;
        let clients = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::db_error)?;

        Ok(ClientPage {
            clients,
            total,
            page,
            per_page,
        })
    }
}

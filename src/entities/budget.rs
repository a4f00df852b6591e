use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Budget (price quote) lifecycle states. Budgets never touch stock;
/// acceptance is handled by creating a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Offered,
    Accepted,
    Rejected,
    Expired,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Offered => "offered",
            BudgetStatus::Accepted => "accepted",
            BudgetStatus::Rejected => "rejected",
            BudgetStatus::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "offered" => Some(BudgetStatus::Offered),
            "accepted" => Some(BudgetStatus::Accepted),
            "rejected" => Some(BudgetStatus::Rejected),
            "expired" => Some(BudgetStatus::Expired),
            _ => None,
        }
    }
}

/// A price quote. `total_cents` is always recomputed server-side from the
/// item rows; client-supplied totals are never persisted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub enterprise_id: Uuid,
    pub client_id: Uuid,
    pub total_cents: i64,
    pub valid_until: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budget_item::Entity")]
    BudgetItems,
}

impl Related<super::budget_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetItems.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {}

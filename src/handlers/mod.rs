//! HTTP handlers, one module per resource.
//!
//! Handlers are thin: they authenticate, deserialize, call one service
//! method and map the result. All tenant scoping happens in the services
//! through the enterprise id the token carries.

pub mod budgets;
pub mod clients;
pub mod common;
pub mod enterprise;
pub mod products;
pub mod sales;
pub mod stock;
pub mod suppliers;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    budgets::BudgetService, clients::ClientService, enterprise::EnterpriseService,
    products::ProductService, sales::SaleService, stock::StockLedgerService,
    suppliers::SupplierService, StockPolicy,
};

/// All services, constructed once at startup and shared via [`crate::AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub products: ProductService,
    pub stock: StockLedgerService,
    pub sales: SaleService,
    pub budgets: BudgetService,
    pub clients: ClientService,
    pub suppliers: SupplierService,
    pub enterprise: EnterpriseService,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>, policy: StockPolicy) -> Self {
        Self {
            products: ProductService::new(db.clone(), event_sender.clone(), policy),
            stock: StockLedgerService::new(db.clone(), event_sender.clone(), policy),
            sales: SaleService::new(db.clone(), event_sender.clone(), policy),
            budgets: BudgetService::new(db.clone(), event_sender.clone()),
            clients: ClientService::new(db.clone(), event_sender.clone()),
            suppliers: SupplierService::new(db.clone(), event_sender.clone()),
            enterprise: EnterpriseService::new(db, event_sender),
        }
    }
}

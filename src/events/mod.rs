//! Domain events emitted after each committed mutation.
//!
//! Delivery is an in-process mpsc channel; the processing loop's only
//! consumer today is page-cache invalidation for the UI layer. A send
//! failure is reported to the caller as `EventError` and never rolls back
//! the already-committed mutation.

use crate::cache::{self, pages, CacheBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Events that can occur in the system. Every variant carries the acting
/// enterprise so downstream consumers can scope their reaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    ProductCreated { enterprise_id: Uuid, product_id: Uuid },
    ProductUpdated { enterprise_id: Uuid, product_id: Uuid },
    ProductDeleted { enterprise_id: Uuid, product_id: Uuid },

    // Stock ledger events
    StockMovementRecorded {
        enterprise_id: Uuid,
        product_id: Uuid,
        movement_type: String,
        quantity: i32,
        new_quantity: i32,
    },
    StockReconciled {
        enterprise_id: Uuid,
        product_id: Uuid,
        corrected_quantity: i32,
    },

    // Sale events
    SaleCreated { enterprise_id: Uuid, sale_id: Uuid },
    SaleCancelled { enterprise_id: Uuid, sale_id: Uuid },
    SaleDeleted { enterprise_id: Uuid, sale_id: Uuid },

    // Budget events
    BudgetCreated { enterprise_id: Uuid, budget_id: Uuid },
    BudgetUpdated { enterprise_id: Uuid, budget_id: Uuid },
    BudgetStatusChanged {
        enterprise_id: Uuid,
        budget_id: Uuid,
        old_status: String,
        new_status: String,
    },
    BudgetDeleted { enterprise_id: Uuid, budget_id: Uuid },

    // Directory events
    ClientCreated { enterprise_id: Uuid, client_id: Uuid },
    ClientUpdated { enterprise_id: Uuid, client_id: Uuid },
    ClientDeleted { enterprise_id: Uuid, client_id: Uuid },
    SupplierCreated { enterprise_id: Uuid, supplier_id: Uuid },
    SupplierUpdated { enterprise_id: Uuid, supplier_id: Uuid },
    SupplierDeleted { enterprise_id: Uuid, supplier_id: Uuid },

    // Tenant profile events
    EnterpriseUpdated { enterprise_id: Uuid },
}

impl Event {
    /// Cached pages whose rendering depends on the aggregate this event
    /// changed.
    pub fn affected_pages(&self) -> &'static [&'static str] {
        match self {
            Event::ProductCreated { .. }
            | Event::ProductUpdated { .. }
            | Event::ProductDeleted { .. } => &[pages::PRODUCTS, pages::STOREFRONT],

            Event::StockMovementRecorded { .. } | Event::StockReconciled { .. } => {
                &[pages::PRODUCTS, pages::STOREFRONT, pages::STOCK_DASHBOARD]
            }

            // Creating or cancelling a sale also moves stock.
            Event::SaleCreated { .. } | Event::SaleCancelled { .. } => &[
                pages::SALES,
                pages::PRODUCTS,
                pages::STOREFRONT,
                pages::STOCK_DASHBOARD,
            ],
            Event::SaleDeleted { .. } => &[pages::SALES],

            Event::BudgetCreated { .. }
            | Event::BudgetUpdated { .. }
            | Event::BudgetStatusChanged { .. }
            | Event::BudgetDeleted { .. } => &[pages::BUDGETS],

            Event::ClientCreated { .. }
            | Event::ClientUpdated { .. }
            | Event::ClientDeleted { .. } => &[pages::CLIENTS],

            Event::SupplierCreated { .. }
            | Event::SupplierUpdated { .. }
            | Event::SupplierDeleted { .. } => &[pages::SUPPLIERS],

            Event::EnterpriseUpdated { .. } => &[pages::ENTERPRISE],
        }
    }
}

/// Consumes the event channel, invalidating the cached pages each event
/// names. Runs until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, cache: Arc<dyn CacheBackend>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        let pages = event.affected_pages();
        if let Err(e) = cache::invalidate_pages(cache.as_ref(), pages).await {
            error!(error = %e, event = ?event, "Failed to invalidate cached pages");
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCache;

    #[test]
    fn sale_cancellation_touches_stock_pages() {
        let event = Event::SaleCancelled {
            enterprise_id: Uuid::new_v4(),
            sale_id: Uuid::new_v4(),
        };
        let affected = event.affected_pages();
        assert!(affected.contains(&pages::SALES));
        assert!(affected.contains(&pages::PRODUCTS));
        assert!(affected.contains(&pages::STOCK_DASHBOARD));
    }

    #[test]
    fn budget_events_do_not_touch_stock_pages() {
        let event = Event::BudgetCreated {
            enterprise_id: Uuid::new_v4(),
            budget_id: Uuid::new_v4(),
        };
        assert_eq!(event.affected_pages(), &[pages::BUDGETS]);
    }

    #[tokio::test]
    async fn processing_loop_invalidates_affected_pages() {
        let cache = Arc::new(InMemoryCache::new());
        cache.set(pages::SALES, "html", None).await.unwrap();
        cache.set(pages::BUDGETS, "html", None).await.unwrap();

        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(process_events(rx, cache.clone()));

        let sender = EventSender::new(tx);
        sender
            .send(Event::SaleDeleted {
                enterprise_id: Uuid::new_v4(),
                sale_id: Uuid::new_v4(),
            })
            .await
            .unwrap();
        drop(sender);
        handle.await.unwrap();

        assert!(!cache.exists(pages::SALES).await.unwrap());
        assert!(cache.exists(pages::BUDGETS).await.unwrap());
    }
}

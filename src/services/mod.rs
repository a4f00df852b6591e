pub mod budgets;
pub mod clients;
pub mod enterprise;
pub mod products;
pub mod sales;
pub mod stock;
pub mod suppliers;

/// Stock bookkeeping policy, resolved from configuration at startup.
#[derive(Debug, Clone, Copy)]
pub struct StockPolicy {
    /// When false, an exit movement that would drive stock below zero is
    /// rejected with `InsufficientStock` instead of being applied.
    pub allow_negative_stock: bool,
}

impl Default for StockPolicy {
    fn default() -> Self {
        Self {
            allow_negative_stock: true,
        }
    }
}

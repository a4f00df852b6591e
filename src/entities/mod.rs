pub mod budget;
pub mod budget_item;
pub mod client;
pub mod enterprise;
pub mod product;
pub mod sale;
pub mod sale_item;
pub mod stock_movement;
pub mod supplier;

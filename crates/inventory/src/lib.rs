//! Inventory ledger rules.
//!
//! This crate contains the business rules for the warehouse ledger, implemented
//! purely as deterministic logic (no IO, no SQL, no console).

pub mod item;
pub mod movement;
pub mod snapshot;

pub use item::{ItemDefinition, NewItem};
pub use movement::{StockBalance, StockIn, StockOut, StockOutPlan, plan_stock_in, plan_stock_out};
pub use snapshot::{ItemSnapshot, LocationBalance, StockRow, group_rows};

//! `warehouse-core` — validated building blocks shared by the ledger crates.
//!
//! This crate contains **pure domain** primitives (no storage, no console IO).

pub mod code;
pub mod error;
pub mod quantity;

pub use code::{ItemCode, ItemName, LocationCode};
pub use error::{DomainError, DomainResult, StockScope};
pub use quantity::Quantity;

//! Inventory ledger: the store boundary for every stock operation.
//!
//! The ledger keeps three record kinds consistent:
//!
//! - **item definitions** (`item_code` → name, description)
//! - **inventory totals** (one aggregate quantity per item)
//! - **location stock** (one quantity per item and location)
//!
//! After every committed operation the total of an item equals the sum of its
//! location quantities. Multi-record operations (stock in, stock out, delete,
//! purge) are all-or-nothing.
//!
//! ## Stock-out concurrency
//!
//! The balance check and the writes of a stock-out run in one transaction and
//! every write is guarded on the balance it expects, so two concurrent
//! removals can never both succeed against the same stale balance.

mod in_memory;
mod sqlite;

pub use in_memory::InMemoryLedger;
pub use sqlite::SqliteLedger;

use async_trait::async_trait;

use warehouse_core::ItemCode;
use warehouse_inventory::{ItemSnapshot, NewItem, StockIn, StockOut, StockOutPlan};

use crate::error::LedgerError;

/// Ledger store abstraction.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Define a new item. Fails with `DuplicateKey` when the code exists.
    async fn define_item(&self, item: &NewItem) -> Result<(), LedgerError>;

    /// Add stock at a location, creating total and location rows as needed.
    ///
    /// Fails with `Referential` when the item is not defined; nothing is written.
    async fn stock_in(&self, cmd: &StockIn) -> Result<(), LedgerError>;

    /// Remove stock from a location after checking both balances.
    ///
    /// Returns the applied plan (row removed or decremented).
    async fn stock_out(&self, cmd: &StockOut) -> Result<StockOutPlan, LedgerError>;

    /// Delete an item with all its location and total rows.
    async fn delete_item(&self, item: &ItemCode) -> Result<(), LedgerError>;

    /// Read one item with its locations sorted by location code.
    async fn read_item(&self, item: &ItemCode) -> Result<ItemSnapshot, LedgerError>;

    /// Read every defined item, ordered by item code then location code.
    async fn read_all_items(&self) -> Result<Vec<ItemSnapshot>, LedgerError>;

    /// Remove every row from all three record kinds (dependents first).
    async fn purge_all(&self) -> Result<(), LedgerError>;
}

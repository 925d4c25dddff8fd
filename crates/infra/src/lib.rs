//! Infrastructure layer: ledger stores, schema, config, sample data.

pub mod config;
pub mod error;
pub mod ledger;
pub mod schema;
pub mod seed;


pub use config::{ConfigError, WarehouseConfig};
pub use error::LedgerError;
pub use ledger::{InMemoryLedger, InventoryLedger, SqliteLedger};

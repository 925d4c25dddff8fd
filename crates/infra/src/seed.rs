//! Sample data for demos and smoke tests.

use warehouse_core::DomainError;
use warehouse_inventory::{NewItem, StockIn};

use crate::error::LedgerError;
use crate::ledger::InventoryLedger;

/// One sample item and where its initial stock sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleItem {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub location: &'static str,
    pub quantity: i64,
}

pub const SAMPLE_ITEMS: [SampleItem; 3] = [
    SampleItem {
        code: "CPU-I7-12700K",
        name: "Intel Core i7-12700K",
        description: "12th Gen Intel Processor",
        location: "Shelf A, Row 1",
        quantity: 50,
    },
    SampleItem {
        code: "GPU-RTX-3080",
        name: "NVIDIA GeForce RTX 3080",
        description: "10GB GDDR6X Graphics Card",
        location: "Shelf B, Row 3",
        quantity: 25,
    },
    SampleItem {
        code: "RAM-DDR5-32G",
        name: "Corsair Vengeance DDR5 32GB",
        description: "2x16GB, 5200MHz",
        location: "Shelf A, Row 2",
        quantity: 100,
    },
];

impl SampleItem {
    fn commands(&self) -> Result<(NewItem, StockIn), DomainError> {
        let item = NewItem::parse(self.code, self.name)?.with_description(self.description);
        let stock = StockIn::parse(self.code, self.location, self.quantity)?;
        Ok((item, stock))
    }
}

/// Replace the ledger contents with [`SAMPLE_ITEMS`].
///
/// Returns the number of items loaded.
pub async fn load_sample_data<L>(ledger: &L) -> Result<usize, LedgerError>
where
    L: InventoryLedger + ?Sized,
{
    ledger.purge_all().await?;

    for sample in &SAMPLE_ITEMS {
        let (item, stock) = sample.commands()?;
        ledger.define_item(&item).await?;
        ledger.stock_in(&stock).await?;
    }

    tracing::info!(items = SAMPLE_ITEMS.len(), "sample data loaded");
    Ok(SAMPLE_ITEMS.len())
}

//! Replace the inventory database contents with the sample items and print
//! the resulting per-location report (or JSON with `--json`).

use std::io::{self, Write};

use anyhow::Context;
use warehouse_cli::report;
use warehouse_infra::seed::load_sample_data;
use warehouse_infra::{InventoryLedger, SqliteLedger, WarehouseConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    warehouse_observability::init();

    let json = std::env::args().skip(1).any(|arg| arg == "--json");

    let config = WarehouseConfig::from_env().context("invalid warehouse configuration")?;
    let ledger = SqliteLedger::connect(&config)
        .await
        .with_context(|| format!("failed to open inventory database {}", config.database_url))?;

    let mut out = io::stdout().lock();
    if !json {
        writeln!(out, "Connected to {}; schema ready.", config.database_url)?;
        writeln!(out, "Clearing existing records and loading sample data...")?;
    }

    let loaded = load_sample_data(&ledger)
        .await
        .context("loading sample data failed")?;
    let items = ledger
        .read_all_items()
        .await
        .context("reading inventory back failed")?;

    if json {
        report::write_json(&mut out, &items)?;
    } else {
        writeln!(out, "Loaded {loaded} sample items.")?;
        report::write_location_report(&mut out, &items)?;
    }

    ledger.pool().close().await;
    Ok(())
}

use std::io;

use anyhow::Context;
use warehouse_cli::{Console, menu};
use warehouse_infra::{SqliteLedger, WarehouseConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    warehouse_observability::init();

    let config = WarehouseConfig::from_env().context("invalid warehouse configuration")?;
    let ledger = SqliteLedger::connect(&config)
        .await
        .with_context(|| format!("failed to open inventory database {}", config.database_url))?;

    tracing::info!(database_url = %config.database_url, "inventory database ready");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock(), config.cancel_keyword.clone());

    let result = menu::run(&ledger, &mut console).await;
    ledger.pool().close().await;

    result.context("console i/o failed")
}

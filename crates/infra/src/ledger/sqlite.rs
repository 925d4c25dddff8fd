//! SQLite-backed ledger.
//!
//! Every multi-statement operation runs inside one SQLx transaction:
//!
//! 1. Begin
//! 2. Run the statements (reads included, for stock-out)
//! 3. Commit on success, roll back on the first failure
//!
//! A rollback that fails is reported as `LedgerError::RollbackFailure`
//! carrying the failure that triggered it.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::instrument;

use warehouse_core::{DomainError, ItemCode, ItemName, LocationCode, StockScope};
use warehouse_inventory::{
    ItemSnapshot, NewItem, StockBalance, StockIn, StockOut, StockOutPlan, StockRow, group_rows,
    plan_stock_in, plan_stock_out,
};

use super::InventoryLedger;
use crate::config::WarehouseConfig;
use crate::error::{LedgerError, map_sqlx_error};
use crate::schema::ensure_schema;

const SELECT_ITEM_ROWS: &str = r#"
    SELECT
        d.item_code,
        d.item_name,
        d.description,
        i.total_quantity,
        l.location_code,
        l.quantity_at_location,
        l.last_updated
    FROM item_definitions d
    LEFT JOIN inventory i ON d.item_code = i.item_code
    LEFT JOIN item_locations l ON d.item_code = l.item_code
    WHERE d.item_code = ?1
    ORDER BY l.location_code
"#;

const SELECT_ALL_ROWS: &str = r#"
    SELECT
        d.item_code,
        d.item_name,
        d.description,
        i.total_quantity,
        l.location_code,
        l.quantity_at_location,
        l.last_updated
    FROM item_definitions d
    LEFT JOIN inventory i ON d.item_code = i.item_code
    LEFT JOIN item_locations l ON d.item_code = l.item_code
    ORDER BY d.item_code, l.location_code
"#;

/// Ledger over a SQLite connection pool.
///
/// `SqlitePool` is `Send + Sync` and cheap to clone; the ledger is passed
/// explicitly to every caller instead of living in global state.
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Wrap an existing pool. The schema is assumed to exist.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the configured database and ensure the schema.
    pub async fn connect(config: &WarehouseConfig) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .with_context(|| format!("invalid database url '{}'", config.database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open SQLite database at '{}'", config.database_url))?;

        ensure_schema(&pool)
            .await
            .context("failed to create ledger tables")?;

        tracing::info!(database_url = %config.database_url, "ledger connected");
        Ok(Self::new(pool))
    }

    /// A private in-memory database on a single pinned connection.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("invalid in-memory url")?
            .foreign_keys(true);

        // Each connection to `:memory:` is its own database; keep exactly one alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .context("failed to open in-memory SQLite database")?;

        ensure_schema(&pool)
            .await
            .context("failed to create ledger tables")?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn begin(&self, operation: &'static str) -> Result<Transaction<'static, Sqlite>, LedgerError> {
        self.pool
            .begin()
            .await
            .map_err(|e| LedgerError::transaction(operation, format!("failed to begin: {e}")))
    }
}

/// Commit on success; roll back otherwise.
async fn finish<T>(
    tx: Transaction<'static, Sqlite>,
    operation: &'static str,
    outcome: Result<T, LedgerError>,
) -> Result<T, LedgerError> {
    match outcome {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| LedgerError::transaction(operation, format!("failed to commit: {e}")))?;
            Ok(value)
        }
        Err(cause) => Err(rollback(tx, operation, cause).await),
    }
}

async fn rollback(
    tx: Transaction<'static, Sqlite>,
    operation: &'static str,
    cause: LedgerError,
) -> LedgerError {
    match tx.rollback().await {
        Ok(()) => {
            if cause.is_rejection() {
                tracing::debug!(operation, reason = %cause, "transaction rolled back");
            } else {
                tracing::warn!(operation, error = %cause, "transaction rolled back");
            }
            cause
        }
        Err(e) => {
            tracing::error!(
                operation,
                error = %e,
                cause = %cause,
                "rollback failed; ledger state must be verified"
            );
            LedgerError::RollbackFailure {
                operation,
                message: e.to_string(),
                cause: Box::new(cause),
            }
        }
    }
}

async fn apply_stock_in(conn: &mut SqliteConnection, cmd: &StockIn) -> Result<(), LedgerError> {
    let balance = read_balance(conn, "stock_in", &cmd.item, &cmd.location)
        .await?
        .ok_or_else(|| LedgerError::Referential(cmd.item.to_string()))?;
    plan_stock_in(balance, cmd)?;

    let quantity = cmd.quantity.get();
    // Largest stored value the increment can be applied to without overflowing.
    let ceiling = i64::MAX - quantity;

    let total_result = sqlx::query(
        r#"
        INSERT INTO inventory (item_code, total_quantity)
        VALUES (?1, ?2)
        ON CONFLICT (item_code)
        DO UPDATE SET total_quantity = total_quantity + excluded.total_quantity
        WHERE total_quantity <= ?3
        "#,
    )
    .bind(cmd.item.as_str())
    .bind(quantity)
    .bind(ceiling)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("stock_in", &cmd.item, e))?;

    let location_result = sqlx::query(
        r#"
        INSERT INTO item_locations (item_code, location_code, quantity_at_location, last_updated)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (item_code, location_code)
        DO UPDATE SET
            quantity_at_location = quantity_at_location + excluded.quantity_at_location,
            last_updated = excluded.last_updated
        WHERE quantity_at_location <= ?5
        "#,
    )
    .bind(cmd.item.as_str())
    .bind(cmd.location.as_str())
    .bind(quantity)
    .bind(Utc::now())
    .bind(ceiling)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("stock_in", &cmd.item, e))?;

    if total_result.rows_affected() != 1 || location_result.rows_affected() != 1 {
        return Err(LedgerError::transaction(
            "stock_in",
            "balance changed while the stock-in was applied",
        ));
    }

    Ok(())
}

/// Read the total and location balance of an item.
///
/// `None` when the item itself is not defined.
async fn read_balance(
    conn: &mut SqliteConnection,
    operation: &'static str,
    item: &ItemCode,
    location: &LocationCode,
) -> Result<Option<StockBalance>, LedgerError> {
    let row = sqlx::query(
        r#"
        SELECT i.total_quantity, l.quantity_at_location
        FROM item_definitions d
        LEFT JOIN inventory i ON d.item_code = i.item_code
        LEFT JOIN item_locations l
            ON d.item_code = l.item_code AND l.location_code = ?1
        WHERE d.item_code = ?2
        "#,
    )
    .bind(location.as_str())
    .bind(item.as_str())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error(operation, item, e))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let decode = |e: sqlx::Error| LedgerError::transaction(operation, format!("failed to decode balance: {e}"));
    Ok(Some(StockBalance {
        total: row.try_get("total_quantity").map_err(decode)?,
        at_location: row.try_get("quantity_at_location").map_err(decode)?,
    }))
}

async fn apply_stock_out(
    conn: &mut SqliteConnection,
    cmd: &StockOut,
) -> Result<StockOutPlan, LedgerError> {
    let balance = read_balance(conn, "stock_out", &cmd.item, &cmd.location)
        .await?
        .ok_or_else(|| LedgerError::NotFound(cmd.item.to_string()))?;
    let plan = plan_stock_out(balance, cmd)?;
    write_stock_out(conn, cmd, balance, plan).await?;
    Ok(plan)
}

/// Apply a planned removal.
///
/// Each write re-checks the balance the plan was made against; a stale plan
/// fails with `InsufficientStock` and the caller rolls back.
async fn write_stock_out(
    conn: &mut SqliteConnection,
    cmd: &StockOut,
    balance: StockBalance,
    plan: StockOutPlan,
) -> Result<(), LedgerError> {
    let quantity = plan.quantity();

    let location_result = match plan {
        StockOutPlan::RemoveLocation { .. } => {
            sqlx::query(
                r#"
                DELETE FROM item_locations
                WHERE item_code = ?1 AND location_code = ?2 AND quantity_at_location = ?3
                "#,
            )
            .bind(cmd.item.as_str())
            .bind(cmd.location.as_str())
            .bind(quantity)
            .execute(&mut *conn)
            .await
        }
        StockOutPlan::DecrementLocation { .. } => {
            sqlx::query(
                r#"
                UPDATE item_locations
                SET quantity_at_location = quantity_at_location - ?3,
                    last_updated = ?4
                WHERE item_code = ?1 AND location_code = ?2 AND quantity_at_location > ?3
                "#,
            )
            .bind(cmd.item.as_str())
            .bind(cmd.location.as_str())
            .bind(quantity)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await
        }
    }
    .map_err(|e| map_sqlx_error("stock_out", &cmd.item, e))?;

    if location_result.rows_affected() != 1 {
        return Err(DomainError::insufficient(
            StockScope::Location(cmd.location.clone()),
            balance.at_location_or_zero(),
            quantity,
        )
        .into());
    }

    let total_result = sqlx::query(
        r#"
        UPDATE inventory
        SET total_quantity = total_quantity - ?2
        WHERE item_code = ?1 AND total_quantity >= ?2
        "#,
    )
    .bind(cmd.item.as_str())
    .bind(quantity)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("stock_out", &cmd.item, e))?;

    if total_result.rows_affected() != 1 {
        return Err(DomainError::insufficient(StockScope::Total, balance.total_or_zero(), quantity).into());
    }

    Ok(())
}

async fn apply_delete(conn: &mut SqliteConnection, item: &ItemCode) -> Result<(), LedgerError> {
    let exists = sqlx::query("SELECT 1 FROM item_definitions WHERE item_code = ?1")
        .bind(item.as_str())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("delete_item", item, e))?;
    if exists.is_none() {
        return Err(LedgerError::NotFound(item.to_string()));
    }

    // Dependents first: both stock tables reference the definition.
    let mut removed = 0;
    for statement in [
        "DELETE FROM item_locations WHERE item_code = ?1",
        "DELETE FROM inventory WHERE item_code = ?1",
        "DELETE FROM item_definitions WHERE item_code = ?1",
    ] {
        removed += sqlx::query(statement)
            .bind(item.as_str())
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("delete_item", item, e))?
            .rows_affected();
    }

    tracing::debug!(item = %item, rows = removed, "item rows removed");
    Ok(())
}

fn decode_row(operation: &'static str, row: &SqliteRow) -> Result<StockRow, LedgerError> {
    let decode = |e: sqlx::Error| LedgerError::transaction(operation, format!("failed to decode row: {e}"));
    let invalid = |e: DomainError| LedgerError::transaction(operation, format!("stored row is invalid: {e}"));

    let code: String = row.try_get("item_code").map_err(decode)?;
    let name: String = row.try_get("item_name").map_err(decode)?;
    let description: Option<String> = row.try_get("description").map_err(decode)?;
    let total: Option<i64> = row.try_get("total_quantity").map_err(decode)?;
    let location_code: Option<String> = row.try_get("location_code").map_err(decode)?;
    let quantity: Option<i64> = row.try_get("quantity_at_location").map_err(decode)?;
    let updated_at: Option<DateTime<Utc>> = row.try_get("last_updated").map_err(decode)?;

    Ok(StockRow {
        code: ItemCode::parse(&code).map_err(invalid)?,
        name: ItemName::parse(&name).map_err(invalid)?,
        description,
        total,
        location: StockRow::location_from_columns(location_code.as_deref(), quantity, updated_at)
            .map_err(invalid)?,
    })
}

#[async_trait]
impl InventoryLedger for SqliteLedger {
    #[instrument(skip(self, item), fields(item = %item.code))]
    async fn define_item(&self, item: &NewItem) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            INSERT INTO item_definitions (item_code, item_name, description)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(item.code.as_str())
        .bind(item.name.as_str())
        .bind(item.description.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("define_item", &item.code, e))?;

        tracing::info!("item defined");
        Ok(())
    }

    #[instrument(
        skip(self, cmd),
        fields(item = %cmd.item, location = %cmd.location, quantity = %cmd.quantity)
    )]
    async fn stock_in(&self, cmd: &StockIn) -> Result<(), LedgerError> {
        let mut tx = self.begin("stock_in").await?;
        let outcome = apply_stock_in(&mut tx, cmd).await;
        finish(tx, "stock_in", outcome).await?;

        tracing::info!("stock received");
        Ok(())
    }

    #[instrument(
        skip(self, cmd),
        fields(item = %cmd.item, location = %cmd.location, quantity = %cmd.quantity)
    )]
    async fn stock_out(&self, cmd: &StockOut) -> Result<StockOutPlan, LedgerError> {
        let mut tx = self.begin("stock_out").await?;
        let outcome = apply_stock_out(&mut tx, cmd).await;
        let plan = finish(tx, "stock_out", outcome).await?;

        tracing::info!(?plan, "stock removed");
        Ok(plan)
    }

    #[instrument(skip(self, item), fields(item = %item))]
    async fn delete_item(&self, item: &ItemCode) -> Result<(), LedgerError> {
        let mut tx = self.begin("delete_item").await?;
        let outcome = apply_delete(&mut tx, item).await;
        finish(tx, "delete_item", outcome).await?;

        tracing::info!("item deleted");
        Ok(())
    }

    #[instrument(skip(self, item), fields(item = %item))]
    async fn read_item(&self, item: &ItemCode) -> Result<ItemSnapshot, LedgerError> {
        let rows = sqlx::query(SELECT_ITEM_ROWS)
            .bind(item.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("read_item", item, e))?;

        let rows = rows
            .iter()
            .map(|row| decode_row("read_item", row))
            .collect::<Result<Vec<_>, _>>()?;

        group_rows(rows)
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::NotFound(item.to_string()))
    }

    #[instrument(skip(self))]
    async fn read_all_items(&self) -> Result<Vec<ItemSnapshot>, LedgerError> {
        let rows = sqlx::query(SELECT_ALL_ROWS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| LedgerError::transaction("read_all_items", e.to_string()))?;

        let rows = rows
            .iter()
            .map(|row| decode_row("read_all_items", row))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(group_rows(rows))
    }

    #[instrument(skip(self))]
    async fn purge_all(&self) -> Result<(), LedgerError> {
        let mut tx = self.begin("purge_all").await?;
        let mut outcome = Ok(());
        for statement in [
            "DELETE FROM item_locations",
            "DELETE FROM inventory",
            "DELETE FROM item_definitions",
        ] {
            if let Err(e) = sqlx::query(statement).execute(&mut *tx).await {
                outcome = Err(LedgerError::transaction("purge_all", e.to_string()));
                break;
            }
        }
        finish(tx, "purge_all", outcome).await?;

        tracing::info!("ledger purged");
        Ok(())
    }
}

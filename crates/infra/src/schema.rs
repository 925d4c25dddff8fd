//! Idempotent schema bootstrap for the three ledger tables.
//!
//! `inventory` and `item_locations` both reference `item_definitions`, so
//! dependents must be removed before their definition.

use sqlx::SqlitePool;

const CREATE_ITEM_DEFINITIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS item_definitions (
        item_code   TEXT PRIMARY KEY NOT NULL,
        item_name   TEXT NOT NULL,
        description TEXT NULL
    )
"#;

const CREATE_INVENTORY: &str = r#"
    CREATE TABLE IF NOT EXISTS inventory (
        item_code      TEXT PRIMARY KEY NOT NULL
                       REFERENCES item_definitions (item_code),
        total_quantity INTEGER NOT NULL CHECK (total_quantity >= 0)
    )
"#;

const CREATE_ITEM_LOCATIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS item_locations (
        item_code            TEXT NOT NULL REFERENCES item_definitions (item_code),
        location_code        TEXT NOT NULL,
        quantity_at_location INTEGER NOT NULL CHECK (quantity_at_location >= 0),
        last_updated         TEXT NOT NULL,
        PRIMARY KEY (item_code, location_code)
    )
"#;

/// Create the ledger tables if they do not exist yet.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in [CREATE_ITEM_DEFINITIONS, CREATE_INVENTORY, CREATE_ITEM_LOCATIONS] {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::debug!("ledger schema ready");
    Ok(())
}

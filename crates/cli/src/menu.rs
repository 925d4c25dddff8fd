//! Interactive menu over an [`InventoryLedger`].
//!
//! Every ledger failure is turned into a one-line message; the loop only ends
//! on `0` or end of input.

use std::io::{self, BufRead, Write};

use warehouse_core::{ItemCode, LocationCode, Quantity};
use warehouse_infra::{InventoryLedger, LedgerError};
use warehouse_inventory::{NewItem, StockIn, StockOut, StockOutPlan};

use crate::console::Console;
use crate::report;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Exit,
    DefineItem,
    StockIn,
    QueryItem,
    FullReport,
    StockOut,
    DeleteItem,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().parse::<u8>().ok()? {
            0 => Some(Self::Exit),
            1 => Some(Self::DefineItem),
            2 => Some(Self::StockIn),
            3 => Some(Self::QueryItem),
            4 => Some(Self::FullReport),
            5 => Some(Self::StockOut),
            6 => Some(Self::DeleteItem),
            _ => None,
        }
    }
}

fn write_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "===== Warehouse Inventory =====")?;
    writeln!(out, "1. Define item")?;
    writeln!(out, "2. Stock in to a location")?;
    writeln!(out, "3. Query item stock")?;
    writeln!(out, "4. Full inventory report")?;
    writeln!(out, "5. Stock out from a location")?;
    writeln!(out, "6. Delete item (all records)")?;
    writeln!(out, "0. Exit")?;
    writeln!(out, "===============================")
}

/// User-facing message for a failed action.
pub fn describe_failure(action: &str, err: &LedgerError) -> String {
    match err {
        LedgerError::DuplicateKey(code) => {
            format!("{action} failed: item code '{code}' already exists.")
        }
        LedgerError::Referential(code) => {
            format!("{action} failed: item code '{code}' is not defined; define the item first.")
        }
        LedgerError::TransactionFailure { .. } => {
            format!("{action} failed: {err}. All changes were rolled back.")
        }
        LedgerError::RollbackFailure { .. } => format!(
            "SEVERE: {action} failed and could not be rolled back: {err}. \
             Stored quantities must be verified manually."
        ),
        other => format!("{action} failed: {other}."),
    }
}

fn report_failure<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    action: &str,
    err: &LedgerError,
) -> io::Result<()> {
    if err.is_severe() {
        tracing::error!(action, error = %err, "ledger left in unverified state");
    }
    console.say(describe_failure(action, err))
}

/// Run the menu until the user exits or input ends.
pub async fn run<L, R, W>(ledger: &L, console: &mut Console<R, W>) -> io::Result<()>
where
    L: InventoryLedger + ?Sized,
    R: BufRead,
    W: Write,
{
    let hint = format!(
        "Type '{}' at any prompt to cancel and return to the menu.",
        console.cancel_keyword()
    );
    console.say(hint)?;

    loop {
        write_menu(console.output())?;
        let Some(line) = console.ask_raw("Enter your choice: ")? else {
            break;
        };

        let Some(choice) = MenuChoice::parse(&line) else {
            console.say("Invalid choice; enter a number from 0 to 6.")?;
            continue;
        };

        match choice {
            MenuChoice::Exit => break,
            MenuChoice::DefineItem => define_item(ledger, console).await?,
            MenuChoice::StockIn => stock_in(ledger, console).await?,
            MenuChoice::QueryItem => query_item(ledger, console).await?,
            MenuChoice::FullReport => full_report(ledger, console).await?,
            MenuChoice::StockOut => stock_out(ledger, console).await?,
            MenuChoice::DeleteItem => delete_item(ledger, console).await?,
        }

        if console.is_closed() {
            break;
        }
    }

    console.say("Goodbye.")
}

/// Parse a console value, reporting the validation failure on error.
fn parse_or_report<T, R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    action: &str,
    parsed: Result<T, warehouse_core::DomainError>,
) -> io::Result<Option<T>> {
    match parsed {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            console.say(describe_failure(action, &e.into()))?;
            Ok(None)
        }
    }
}

async fn define_item<L, R, W>(ledger: &L, console: &mut Console<R, W>) -> io::Result<()>
where
    L: InventoryLedger + ?Sized,
    R: BufRead,
    W: Write,
{
    const ACTION: &str = "Define item";

    let Some(code) = console.ask("Item code: ")? else { return Ok(()) };
    let Some(name) = console.ask("Item name: ")? else { return Ok(()) };
    let Some(description) = console.ask("Description (optional): ")? else { return Ok(()) };

    let parsed = NewItem::parse(&code, &name).map(|item| item.with_description(description));
    let Some(item) = parse_or_report(console, ACTION, parsed)? else { return Ok(()) };

    match ledger.define_item(&item).await {
        Ok(()) => console.say(format!("Defined item {} -> {}", item.code, item.name)),
        Err(e) => report_failure(console, ACTION, &e),
    }
}

/// Ask for item code, location code and quantity (codes are checked first).
fn ask_movement<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    action: &str,
    verb: &str,
) -> io::Result<Option<(ItemCode, LocationCode, Quantity)>> {
    let Some(code) = console.ask("Item code: ")? else { return Ok(None) };
    let Some(location) = console.ask(&format!("Location code to {verb}: "))? else {
        return Ok(None);
    };

    let codes = ItemCode::parse(&code)
        .and_then(|item| LocationCode::parse(&location).map(|location| (item, location)));
    let Some((item, location)) = parse_or_report(console, action, codes)? else {
        return Ok(None);
    };

    let Some(raw) = console.ask_int("Quantity: ")? else { return Ok(None) };
    let Some(quantity) = parse_or_report(console, action, Quantity::new(raw))? else {
        return Ok(None);
    };

    Ok(Some((item, location, quantity)))
}

async fn stock_in<L, R, W>(ledger: &L, console: &mut Console<R, W>) -> io::Result<()>
where
    L: InventoryLedger + ?Sized,
    R: BufRead,
    W: Write,
{
    const ACTION: &str = "Stock in";

    let Some((item, location, quantity)) = ask_movement(console, ACTION, "stock into")? else {
        return Ok(());
    };
    let cmd = StockIn::new(item, location, quantity);

    match ledger.stock_in(&cmd).await {
        Ok(()) => console.say(format!(
            "Stocked {} x {} into {}.",
            cmd.quantity, cmd.item, cmd.location
        )),
        Err(e) => report_failure(console, ACTION, &e),
    }
}

async fn stock_out<L, R, W>(ledger: &L, console: &mut Console<R, W>) -> io::Result<()>
where
    L: InventoryLedger + ?Sized,
    R: BufRead,
    W: Write,
{
    const ACTION: &str = "Stock out";

    let Some((item, location, quantity)) = ask_movement(console, ACTION, "take stock from")? else {
        return Ok(());
    };
    let cmd = StockOut::new(item, location, quantity);

    match ledger.stock_out(&cmd).await {
        Ok(plan) => {
            console.say(format!(
                "Removed {} x {} from {}.",
                cmd.quantity, cmd.item, cmd.location
            ))?;
            match plan {
                StockOutPlan::RemoveLocation { .. } => {
                    console.say(format!("Location {} is now empty.", cmd.location))
                }
                StockOutPlan::DecrementLocation { remaining, .. } => {
                    console.say(format!("{remaining} left at {}.", cmd.location))
                }
            }
        }
        Err(e) => report_failure(console, ACTION, &e),
    }
}

async fn query_item<L, R, W>(ledger: &L, console: &mut Console<R, W>) -> io::Result<()>
where
    L: InventoryLedger + ?Sized,
    R: BufRead,
    W: Write,
{
    const ACTION: &str = "Query";

    let Some(code) = console.ask("Item code to query: ")? else { return Ok(()) };
    let Some(code) = parse_or_report(console, ACTION, ItemCode::parse(&code))? else {
        return Ok(());
    };

    match ledger.read_item(&code).await {
        Ok(snapshot) => report::write_item(console.output(), &snapshot),
        Err(e) => report_failure(console, ACTION, &e),
    }
}

async fn full_report<L, R, W>(ledger: &L, console: &mut Console<R, W>) -> io::Result<()>
where
    L: InventoryLedger + ?Sized,
    R: BufRead,
    W: Write,
{
    match ledger.read_all_items().await {
        Ok(items) => report::write_full_report(console.output(), &items),
        Err(e) => report_failure(console, "Report", &e),
    }
}

async fn delete_item<L, R, W>(ledger: &L, console: &mut Console<R, W>) -> io::Result<()>
where
    L: InventoryLedger + ?Sized,
    R: BufRead,
    W: Write,
{
    const ACTION: &str = "Delete";

    let Some(code) = console.ask("Item code to PERMANENTLY delete: ")? else { return Ok(()) };
    let Some(code) = parse_or_report(console, ACTION, ItemCode::parse(&code))? else {
        return Ok(());
    };

    let snapshot = match ledger.read_item(&code).await {
        Ok(snapshot) => snapshot,
        Err(e) => return report_failure(console, ACTION, &e),
    };

    console.say(format!(
        "WARNING: this removes '{}' (code {}) with all {} units across {} location(s). It cannot be undone.",
        snapshot.name,
        snapshot.code,
        snapshot.total_quantity,
        snapshot.locations.len()
    ))?;
    if !console.confirm("Delete it? (y/n): ")? {
        return console.say("Delete cancelled.");
    }

    match ledger.delete_item(&code).await {
        Ok(()) => console.say(format!("Deleted item {code} and all its records.")),
        Err(e) => report_failure(console, ACTION, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use warehouse_infra::InMemoryLedger;

    async fn session(ledger: &InMemoryLedger, script: &str) -> String {
        let mut console = Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new(), "cancel");
        run(ledger, &mut console).await.unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    fn code(raw: &str) -> ItemCode {
        ItemCode::parse(raw).unwrap()
    }

    #[test]
    fn menu_choices_parse() {
        assert_eq!(MenuChoice::parse(" 0 "), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("6"), Some(MenuChoice::DeleteItem));
        assert_eq!(MenuChoice::parse("7"), None);
        assert_eq!(MenuChoice::parse("abc"), None);
    }

    #[tokio::test]
    async fn define_stock_and_query_through_the_menu() {
        let ledger = InMemoryLedger::new();
        let script = "1\nCPU-1\nCPU\n\n\
                      2\nCPU-1\nA1\n50\n\
                      2\nCPU-1\nA2\n30\n\
                      3\nCPU-1\n\
                      0\n";
        let out = session(&ledger, script).await;

        assert!(out.contains("Defined item CPU-1 -> CPU"));
        assert!(out.contains("Stocked 50 x CPU-1 into A1."));
        assert!(out.contains("A1: 50"));
        assert!(out.contains("A2: 30"));
        assert!(out.ends_with("Goodbye.\n"));

        let snapshot = ledger.read_item(&code("CPU-1")).await.unwrap();
        assert_eq!(snapshot.total_quantity, 80);
    }

    #[tokio::test]
    async fn cancel_returns_to_the_menu_without_changes() {
        let ledger = InMemoryLedger::new();
        let out = session(&ledger, "1\nCPU-1\ncancel\n0\n").await;

        assert!(out.contains("Operation cancelled."));
        assert!(ledger.read_all_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failures_are_reported_and_the_loop_continues() {
        let ledger = InMemoryLedger::new();
        let script = "2\nGHOST\nA1\n5\n\
                      1\nCPU-1\nCPU\n\n\
                      1\nCPU-1\nCPU again\n\n\
                      2\nCPU-1\nA1\n0\n\
                      5\nCPU-1\nA1\n1\n\
                      9\n\
                      0\n";
        let out = session(&ledger, script).await;

        assert!(out.contains("Stock in failed: item code 'GHOST' is not defined"));
        assert!(out.contains("Define item failed: item code 'CPU-1' already exists."));
        assert!(out.contains("Stock in failed: validation failed: quantity must be a positive integer"));
        assert!(out.contains("Stock out failed: insufficient location 'A1' stock: available 0, requested 1."));
        assert!(out.contains("Invalid choice"));
    }

    #[tokio::test]
    async fn stock_out_reports_emptied_location() {
        let ledger = InMemoryLedger::new();
        let script = "1\nCPU-1\nCPU\n\n\
                      2\nCPU-1\nA1\n50\n\
                      5\nCPU-1\nA1\n20\n\
                      5\nCPU-1\nA1\n30\n\
                      0\n";
        let out = session(&ledger, script).await;

        assert!(out.contains("30 left at A1."));
        assert!(out.contains("Location A1 is now empty."));
        let snapshot = ledger.read_item(&code("CPU-1")).await.unwrap();
        assert_eq!(snapshot.total_quantity, 0);
        assert!(snapshot.locations.is_empty());
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let ledger = InMemoryLedger::new();
        let script = "1\nCPU-1\nCPU\n\n\
                      6\nCPU-1\nn\n\
                      6\nCPU-1\ny\n\
                      6\nCPU-1\n\
                      0\n";
        let out = session(&ledger, script).await;

        assert!(out.contains("Delete cancelled."));
        assert!(out.contains("Deleted item CPU-1 and all its records."));
        assert!(out.contains("Delete failed: item code 'CPU-1' not found."));
        assert!(ledger.read_all_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn end_of_input_exits_cleanly() {
        let ledger = InMemoryLedger::new();
        let out = session(&ledger, "4\n").await;
        assert!(out.contains("No items are defined."));
        assert!(out.ends_with("Goodbye.\n"));
    }

    #[test]
    fn rollback_failures_are_flagged_as_severe() {
        let err = LedgerError::RollbackFailure {
            operation: "stock_out",
            message: "connection reset".to_string(),
            cause: Box::new(LedgerError::transaction("stock_out", "disk full")),
        };
        let msg = describe_failure("Stock out", &err);
        assert!(msg.starts_with("SEVERE:"));
        assert!(msg.contains("verified manually"));
    }
}

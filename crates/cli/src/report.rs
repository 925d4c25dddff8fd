//! Plain-text rendering of ledger snapshots.

use std::io::{self, Write};

use chrono::{DateTime, Utc};

use warehouse_inventory::ItemSnapshot;

const CODE_WIDTH: usize = 16;
const NAME_WIDTH: usize = 28;
const TOTAL_WIDTH: usize = 10;
const LABEL_WIDTH: usize = 12;

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Single-item stock card.
pub fn write_item<W: Write>(out: &mut W, item: &ItemSnapshot) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "----------- Item stock -----------")?;
    writeln!(out, "{:<LABEL_WIDTH$}: {}", "Code", item.code)?;
    writeln!(out, "{:<LABEL_WIDTH$}: {}", "Name", item.name)?;
    if let Some(description) = &item.description {
        writeln!(out, "{:<LABEL_WIDTH$}: {}", "Description", description)?;
    }
    writeln!(out, "{:<LABEL_WIDTH$}: {}", "Total", item.total_quantity)?;

    match item.locations.split_first() {
        None => writeln!(out, "{:<LABEL_WIDTH$}: -", "Locations")?,
        Some((first, rest)) => {
            writeln!(out, "{:<LABEL_WIDTH$}: {}: {}", "Locations", first.location, first.quantity)?;
            for loc in rest {
                writeln!(out, "{:<LABEL_WIDTH$}  {}: {}", "", loc.location, loc.quantity)?;
            }
        }
    }
    writeln!(out, "----------------------------------")
}

/// Every item with its total and per-location quantities.
pub fn write_full_report<W: Write>(out: &mut W, items: &[ItemSnapshot]) -> io::Result<()> {
    let rule = "-".repeat(CODE_WIDTH + NAME_WIDTH + TOTAL_WIDTH + 16);
    writeln!(out)?;
    writeln!(out, "Full inventory report")?;
    writeln!(
        out,
        "{:<CODE_WIDTH$}{:<NAME_WIDTH$}{:<TOTAL_WIDTH$}{}",
        "Code", "Name", "Total", "Location: Qty"
    )?;
    writeln!(out, "{rule}")?;

    if items.is_empty() {
        writeln!(out, "No items are defined.")?;
    }
    for item in items {
        write!(
            out,
            "{:<CODE_WIDTH$}{:<NAME_WIDTH$}{:<TOTAL_WIDTH$}",
            item.code, item.name, item.total_quantity
        )?;
        match item.locations.split_first() {
            None => writeln!(out, "-")?,
            Some((first, rest)) => {
                writeln!(out, "{}: {}", first.location, first.quantity)?;
                for loc in rest {
                    writeln!(
                        out,
                        "{:<pad$}{}: {}",
                        "",
                        loc.location,
                        loc.quantity,
                        pad = CODE_WIDTH + NAME_WIDTH + TOTAL_WIDTH
                    )?;
                }
            }
        }
    }
    writeln!(out, "{rule}")
}

/// One line per item/location pair, ordered by location then item code.
pub fn write_location_report<W: Write>(out: &mut W, items: &[ItemSnapshot]) -> io::Result<()> {
    let mut lines: Vec<_> = items
        .iter()
        .flat_map(|item| item.locations.iter().map(move |loc| (loc, item)))
        .collect();
    lines.sort_by(|(a_loc, a_item), (b_loc, b_item)| {
        a_loc
            .location
            .cmp(&b_loc.location)
            .then_with(|| a_item.code.cmp(&b_item.code))
    });

    writeln!(out)?;
    writeln!(out, "--- Current Warehouse Inventory ---")?;
    for (loc, item) in lines {
        write!(
            out,
            "Location: {}, Code: {}, Name: {}, Quantity: {}",
            loc.location, item.code, item.name, loc.quantity
        )?;
        match &loc.updated_at {
            Some(at) => writeln!(out, ", Updated: {}", timestamp(at))?,
            None => writeln!(out)?,
        }
    }
    writeln!(out, "--- End of Report ---")
}

/// Snapshots as pretty-printed JSON.
pub fn write_json<W: Write>(out: &mut W, items: &[ItemSnapshot]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, items)?;
    writeln!(out)
}

//! Read-side view of the ledger: one snapshot per defined item.
//!
//! The store returns a flat left-joined result (one row per item/location
//! pair, or one row with no location for items that hold no stock). The
//! reduction here folds consecutive rows with the same item code into a
//! single [`ItemSnapshot`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warehouse_core::{DomainError, ItemCode, ItemName, LocationCode};

/// Quantity held at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationBalance {
    pub location: LocationCode,
    pub quantity: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Everything the ledger knows about one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub code: ItemCode,
    pub name: ItemName,
    pub description: Option<String>,
    /// Zero when the item is defined but was never stocked.
    pub total_quantity: i64,
    /// Sorted by location code.
    pub locations: Vec<LocationBalance>,
}

impl ItemSnapshot {
    /// Sum over locations; `None` if it does not fit in an `i64`.
    pub fn location_sum(&self) -> Option<i64> {
        self.locations
            .iter()
            .try_fold(0i64, |acc, l| acc.checked_add(l.quantity))
    }

    /// The ledger invariant: the total equals the sum over locations.
    pub fn is_consistent(&self) -> bool {
        self.location_sum() == Some(self.total_quantity)
    }

    pub fn quantity_at(&self, location: &LocationCode) -> Option<i64> {
        self.locations
            .iter()
            .find(|l| &l.location == location)
            .map(|l| l.quantity)
    }
}

/// One row of the joined `item_definitions ⟕ inventory ⟕ item_locations` read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRow {
    pub code: ItemCode,
    pub name: ItemName,
    pub description: Option<String>,
    pub total: Option<i64>,
    pub location: Option<LocationBalance>,
}

impl StockRow {
    /// Build the location part of a row from nullable join columns.
    ///
    /// A null or blank location code yields no location entry.
    pub fn location_from_columns(
        location_code: Option<&str>,
        quantity: Option<i64>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Result<Option<LocationBalance>, DomainError> {
        let Some(raw) = location_code.filter(|c| !c.trim().is_empty()) else {
            return Ok(None);
        };
        Ok(Some(LocationBalance {
            location: LocationCode::parse(raw)?,
            quantity: quantity.unwrap_or(0),
            updated_at,
        }))
    }
}

/// Group rows (sorted by item code, then location code) into snapshots.
pub fn group_rows<I>(rows: I) -> Vec<ItemSnapshot>
where
    I: IntoIterator<Item = StockRow>,
{
    let mut snapshots: Vec<ItemSnapshot> = Vec::new();

    for row in rows {
        let same_item = snapshots.last().is_some_and(|s| s.code == row.code);
        if !same_item {
            snapshots.push(ItemSnapshot {
                code: row.code,
                name: row.name,
                description: row.description,
                total_quantity: row.total.unwrap_or(0),
                locations: Vec::new(),
            });
        }
        if let (Some(location), Some(current)) = (row.location, snapshots.last_mut()) {
            current.locations.push(location);
        }
    }

    snapshots
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(code: &str, total: Option<i64>, location: Option<(&str, i64)>) -> StockRow {
        StockRow {
            code: ItemCode::parse(code).unwrap(),
            name: ItemName::parse(&format!("{code} name")).unwrap(),
            description: None,
            total,
            location: location.map(|(loc, qty)| LocationBalance {
                location: LocationCode::parse(loc).unwrap(),
                quantity: qty,
                updated_at: None,
            }),
        }
    }

    #[test]
    fn overflowing_location_sum_is_inconsistent() {
        let rows = vec![
            row("BULK-1", Some(i64::MAX), Some(("A1", i64::MAX))),
            row("BULK-1", Some(i64::MAX), Some(("A2", 1))),
        ];
        let snapshot = &group_rows(rows)[0];
        assert_eq!(snapshot.location_sum(), None);
        assert!(!snapshot.is_consistent());
    }

    #[test]
    fn rows_fold_into_one_snapshot_per_item() {
        let rows = vec![
            row("CPU-1", Some(80), Some(("A1", 50))),
            row("CPU-1", Some(80), Some(("A2", 30))),
            row("GPU-1", None, None),
        ];

        let snapshots = group_rows(rows);
        assert_eq!(snapshots.len(), 2);

        let cpu = &snapshots[0];
        assert_eq!(cpu.code.as_str(), "CPU-1");
        assert_eq!(cpu.total_quantity, 80);
        let locs: Vec<_> = cpu
            .locations
            .iter()
            .map(|l| (l.location.as_str(), l.quantity))
            .collect();
        assert_eq!(locs, vec![("A1", 50), ("A2", 30)]);
        assert!(cpu.is_consistent());

        let gpu = &snapshots[1];
        assert_eq!(gpu.total_quantity, 0);
        assert!(gpu.locations.is_empty());
        assert!(gpu.is_consistent());
    }

    #[test]
    fn blank_location_columns_produce_no_entry() {
        assert_eq!(StockRow::location_from_columns(None, None, None).unwrap(), None);
        assert_eq!(
            StockRow::location_from_columns(Some("  "), Some(3), None).unwrap(),
            None
        );
        let loc = StockRow::location_from_columns(Some("B7"), Some(3), None)
            .unwrap()
            .unwrap();
        assert_eq!(loc.location.as_str(), "B7");
        assert_eq!(loc.quantity, 3);
    }

    #[test]
    fn empty_input_yields_no_snapshots() {
        assert!(group_rows(Vec::new()).is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: grouping keeps every location row and one snapshot per item.
        #[test]
        fn grouping_preserves_rows(
            items in prop::collection::btree_map(
                "[A-Z]{3}-[0-9]",
                prop::collection::btree_map("[A-C][0-9]", 1i64..500, 0..4),
                1..6,
            )
        ) {
            let mut rows = Vec::new();
            for (code, locations) in &items {
                let total: i64 = locations.values().sum();
                if locations.is_empty() {
                    rows.push(row(code, None, None));
                }
                for (loc, qty) in locations {
                    rows.push(row(code, Some(total), Some((loc.as_str(), *qty))));
                }
            }

            let snapshots = group_rows(rows);
            prop_assert_eq!(snapshots.len(), items.len());
            for (snapshot, (code, locations)) in snapshots.iter().zip(&items) {
                prop_assert_eq!(snapshot.code.as_str(), code.as_str());
                prop_assert_eq!(snapshot.locations.len(), locations.len());
                prop_assert!(snapshot.is_consistent());
            }
        }
    }
}

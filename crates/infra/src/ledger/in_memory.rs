use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warehouse_core::{ItemCode, LocationCode};
use warehouse_inventory::{
    ItemDefinition, ItemSnapshot, LocationBalance, NewItem, StockBalance, StockIn, StockOut,
    StockOutPlan, StockRow, group_rows, plan_stock_in, plan_stock_out,
};

use super::InventoryLedger;
use crate::error::LedgerError;

#[derive(Debug, Clone)]
struct LocationEntry {
    quantity: i64,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    items: BTreeMap<ItemCode, ItemDefinition>,
    totals: BTreeMap<ItemCode, i64>,
    locations: BTreeMap<(ItemCode, LocationCode), LocationEntry>,
}

impl LedgerState {
    /// Joined rows in item code, location code order.
    fn rows(&self, only: Option<&ItemCode>) -> Vec<StockRow> {
        let mut rows = Vec::new();
        for (code, item) in &self.items {
            if only.is_some_and(|wanted| wanted != code) {
                continue;
            }
            let base = StockRow {
                code: code.clone(),
                name: item.name.clone(),
                description: item.description.clone(),
                total: self.totals.get(code).copied(),
                location: None,
            };

            let mut any_location = false;
            for ((_, location), entry) in self.locations.iter().filter(|((c, _), _)| c == code) {
                any_location = true;
                rows.push(StockRow {
                    location: Some(LocationBalance {
                        location: location.clone(),
                        quantity: entry.quantity,
                        updated_at: Some(entry.updated_at),
                    }),
                    ..base.clone()
                });
            }
            if !any_location {
                rows.push(base);
            }
        }
        rows
    }
}

/// In-memory ledger.
///
/// Intended for tests/dev. Each write builds the next state on a copy and
/// swaps it in only when every step succeeded, so failures leave no trace.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn transact<T, F>(&self, operation: &'static str, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut LedgerState) -> Result<T, LedgerError>,
    {
        let mut state = self
            .state
            .write()
            .map_err(|_| LedgerError::transaction(operation, "lock poisoned"))?;
        let mut next = state.clone();
        let value = f(&mut next)?;
        *state = next;
        Ok(value)
    }

    fn read<T, F>(&self, operation: &'static str, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&LedgerState) -> T,
    {
        let state = self
            .state
            .read()
            .map_err(|_| LedgerError::transaction(operation, "lock poisoned"))?;
        Ok(f(&state))
    }
}

#[async_trait]
impl InventoryLedger for InMemoryLedger {
    async fn define_item(&self, item: &NewItem) -> Result<(), LedgerError> {
        self.transact("define_item", |state| {
            if state.items.contains_key(&item.code) {
                return Err(LedgerError::DuplicateKey(item.code.to_string()));
            }
            state
                .items
                .insert(item.code.clone(), item.clone().into_definition());
            Ok(())
        })
    }

    async fn stock_in(&self, cmd: &StockIn) -> Result<(), LedgerError> {
        self.transact("stock_in", |state| {
            if !state.items.contains_key(&cmd.item) {
                return Err(LedgerError::Referential(cmd.item.to_string()));
            }
            let key = (cmd.item.clone(), cmd.location.clone());
            let balance = StockBalance {
                total: state.totals.get(&cmd.item).copied(),
                at_location: state.locations.get(&key).map(|e| e.quantity),
            };
            let next = plan_stock_in(balance, cmd)?;

            state.totals.insert(cmd.item.clone(), next.total_or_zero());
            let entry = state.locations.entry(key).or_insert(LocationEntry {
                quantity: 0,
                updated_at: Utc::now(),
            });
            entry.quantity = next.at_location_or_zero();
            entry.updated_at = Utc::now();
            Ok(())
        })
    }

    async fn stock_out(&self, cmd: &StockOut) -> Result<StockOutPlan, LedgerError> {
        self.transact("stock_out", |state| {
            if !state.items.contains_key(&cmd.item) {
                return Err(LedgerError::NotFound(cmd.item.to_string()));
            }
            let key = (cmd.item.clone(), cmd.location.clone());
            let balance = StockBalance {
                total: state.totals.get(&cmd.item).copied(),
                at_location: state.locations.get(&key).map(|e| e.quantity),
            };
            let plan = plan_stock_out(balance, cmd)?;

            match plan {
                StockOutPlan::RemoveLocation { .. } => {
                    state.locations.remove(&key);
                }
                StockOutPlan::DecrementLocation { remaining, .. } => {
                    if let Some(entry) = state.locations.get_mut(&key) {
                        entry.quantity = remaining;
                        entry.updated_at = Utc::now();
                    }
                }
            }
            if let Some(total) = state.totals.get_mut(&cmd.item) {
                *total -= plan.quantity();
            }
            Ok(plan)
        })
    }

    async fn delete_item(&self, item: &ItemCode) -> Result<(), LedgerError> {
        self.transact("delete_item", |state| {
            if !state.items.contains_key(item) {
                return Err(LedgerError::NotFound(item.to_string()));
            }
            state.locations.retain(|(code, _), _| code != item);
            state.totals.remove(item);
            state.items.remove(item);
            Ok(())
        })
    }

    async fn read_item(&self, item: &ItemCode) -> Result<ItemSnapshot, LedgerError> {
        let rows = self.read("read_item", |state| state.rows(Some(item)))?;
        group_rows(rows)
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::NotFound(item.to_string()))
    }

    async fn read_all_items(&self) -> Result<Vec<ItemSnapshot>, LedgerError> {
        let rows = self.read("read_all_items", |state| state.rows(None))?;
        Ok(group_rows(rows))
    }

    async fn purge_all(&self) -> Result<(), LedgerError> {
        self.transact("purge_all", |state| {
            *state = LedgerState::default();
            Ok(())
        })
    }
}

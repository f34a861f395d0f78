//! In-process alert store.
//!
//! Clones share one table. A refresh transaction holds the table lock from
//! `begin` until commit or drop and works on a private copy, so a pass is
//! applied all at once or not at all.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use super::{AlertStore, AlertTransaction};
use crate::core::alerts::model::{Alert, AlertCandidate, AlertId};
use crate::core::error::{Error, Result};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<AlertId, Alert>,
    last_id: AlertId,
}

impl Table {
    fn insert(&mut self, candidate: &AlertCandidate) -> AlertId {
        self.last_id += 1;
        let id = self.last_id;
        self.rows
            .insert(id, Alert::from_candidate(id, Utc::now(), candidate));
        id
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryAlertStore {
    table: Arc<Mutex<Table>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        // A panicking writer never leaves a half-applied pass behind: its
        // changes only reach the table on commit.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct MemoryTransaction<'a> {
    guard: MutexGuard<'a, Table>,
    rows: BTreeMap<AlertId, Alert>,
    last_id: AlertId,
}

impl AlertTransaction for MemoryTransaction<'_> {
    fn managed_alerts(&mut self) -> Result<Vec<Alert>> {
        Ok(self
            .rows
            .values()
            .filter(|alert| alert.kind.is_managed())
            .cloned()
            .collect())
    }

    fn insert(&mut self, candidate: &AlertCandidate) -> Result<AlertId> {
        self.last_id += 1;
        let id = self.last_id;
        self.rows
            .insert(id, Alert::from_candidate(id, Utc::now(), candidate));
        Ok(id)
    }

    fn update(&mut self, id: AlertId, candidate: &AlertCandidate) -> Result<()> {
        if let Some(alert) = self.rows.get_mut(&id) {
            alert.refresh_from(candidate);
        }
        Ok(())
    }

    fn delete(&mut self, id: AlertId) -> Result<()> {
        self.rows.remove(&id);
        Ok(())
    }

    fn commit(mut self) -> Result<()> {
        self.guard.rows = std::mem::take(&mut self.rows);
        self.guard.last_id = self.last_id;
        Ok(())
    }
}

impl AlertStore for MemoryAlertStore {
    type Transaction<'a> = MemoryTransaction<'a>;

    fn begin(&mut self) -> Result<MemoryTransaction<'_>> {
        let guard = self.lock();
        let rows = guard.rows.clone();
        let last_id = guard.last_id;
        Ok(MemoryTransaction {
            guard,
            rows,
            last_id,
        })
    }

    fn list(&mut self) -> Result<Vec<Alert>> {
        Ok(self.lock().rows.values().cloned().collect())
    }

    fn mark_read(&mut self, id: AlertId) -> Result<bool> {
        match self.lock().rows.get_mut(&id) {
            Some(alert) => {
                alert.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn create_manual(&mut self, alert: &AlertCandidate) -> Result<AlertId> {
        if alert.kind.is_managed() {
            return Err(Error::ManagedKind(alert.kind));
        }
        Ok(self.lock().insert(alert))
    }

    fn delete_manual(&mut self, id: AlertId) -> Result<bool> {
        let mut table = self.lock();
        let Some(kind) = table.rows.get(&id).map(|alert| alert.kind) else {
            return Ok(false);
        };
        if kind.is_managed() {
            return Err(Error::ManagedKind(kind));
        }
        table.rows.remove(&id);
        Ok(true)
    }
}

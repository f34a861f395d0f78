//! Persistent storage for alerts.
//!
//! The engine only talks to a store through [`AlertTransaction`]: every
//! refresh pass loads, diffs and writes inside one transaction, which also
//! keeps concurrent passes from interleaving. The remaining [`AlertStore`]
//! methods serve the surrounding read model (listing, marking read, and
//! hand-written alerts).

pub mod memory;
pub mod sqlite;

use super::model::{Alert, AlertCandidate, AlertId};
use crate::core::error::Result;

pub use memory::MemoryAlertStore;
pub use sqlite::SqliteAlertStore;

/// One atomic unit of work against the alert table.
///
/// Dropping a transaction without calling [`AlertTransaction::commit`]
/// discards every write made through it.
pub trait AlertTransaction {
    /// All alerts of managed kinds, ordered by id.
    fn managed_alerts(&mut self) -> Result<Vec<Alert>>;

    /// Insert an unread alert, returning its new id.
    fn insert(&mut self, candidate: &AlertCandidate) -> Result<AlertId>;

    /// Overwrite the generated fields of an existing alert and mark it unread.
    fn update(&mut self, id: AlertId, candidate: &AlertCandidate) -> Result<()>;

    fn delete(&mut self, id: AlertId) -> Result<()>;

    fn commit(self) -> Result<()>
    where
        Self: Sized;
}

pub trait AlertStore {
    type Transaction<'a>: AlertTransaction
    where
        Self: 'a;

    /// Start a refresh transaction. Concurrent callers wait until the
    /// current holder commits or drops its transaction.
    fn begin(&mut self) -> Result<Self::Transaction<'_>>;

    /// Every alert, managed or not, ordered by id.
    fn list(&mut self) -> Result<Vec<Alert>>;

    /// Returns false when no alert has this id.
    fn mark_read(&mut self, id: AlertId) -> Result<bool>;

    /// Store a hand-written alert. Managed kinds are refused.
    fn create_manual(&mut self, alert: &AlertCandidate) -> Result<AlertId>;

    /// Delete a hand-written alert. Managed kinds are refused, their rows
    /// only go away when their condition resolves.
    fn delete_manual(&mut self, id: AlertId) -> Result<bool>;
}

//! SQLite-backed alert store.
//!
//! Refresh transactions are opened IMMEDIATE so the write lock is taken
//! before the managed rows are read; a second pass on another connection
//! waits (up to the busy timeout) and then sees the first pass's writes.
//! A partial unique index on the identity of managed rows backs the
//! one-row-per-key invariant.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

use super::{AlertStore, AlertTransaction};
use crate::core::alerts::model::{Alert, AlertCandidate, AlertId, AlertKind, MANAGED_KINDS};
use crate::core::error::{Error, Result};

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);
const EXPIRES_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const COLUMNS: &str = "id, kind, priority, title, message, subject_employee_id, \
     subject_employee_name, is_read, created_at, expires_at, identity_key, detail";

/// `'birthday', 'work_anniversary', ...` for use in SQL.
fn managed_kinds_sql() -> String {
    MANAGED_KINDS
        .iter()
        .map(|kind| format!("'{}'", kind.as_str()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn schema() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS alerts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            priority TEXT NOT NULL,
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            subject_employee_id TEXT,
            subject_employee_name TEXT,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            expires_at TEXT,
            identity_key TEXT NOT NULL DEFAULT '',
            detail TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS alerts_kind ON alerts (kind);
        CREATE UNIQUE INDEX IF NOT EXISTS alerts_managed_identity
            ON alerts (kind, subject_employee_id, identity_key)
            WHERE kind IN ({});",
        managed_kinds_sql()
    )
}

pub struct SqliteAlertStore {
    conn: Connection,
}

impl SqliteAlertStore {
    /// Open (creating if needed) the alert table in the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::initialize(conn)
    }

    /// Open a private in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch(&schema())?;
        Ok(Self { conn })
    }
}

/// Column values as stored, before parsing.
struct RawAlert {
    id: AlertId,
    kind: String,
    priority: String,
    title: String,
    message: String,
    subject_employee_id: Option<String>,
    subject_employee_name: Option<String>,
    read: bool,
    created_at: String,
    expires_at: Option<String>,
    identity_key: String,
    detail: String,
}

impl RawAlert {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            priority: row.get(2)?,
            title: row.get(3)?,
            message: row.get(4)?,
            subject_employee_id: row.get(5)?,
            subject_employee_name: row.get(6)?,
            read: row.get(7)?,
            created_at: row.get(8)?,
            expires_at: row.get(9)?,
            identity_key: row.get(10)?,
            detail: row.get(11)?,
        })
    }

    fn into_alert(self) -> Result<Alert> {
        let id = self.id;
        let malformed = |reason: String| Error::MalformedRow { id, reason };

        let subject_employee_id = self
            .subject_employee_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|e| malformed(format!("subject_employee_id: {e}")))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| malformed(format!("created_at: {e}")))?
            .with_timezone(&Utc);
        let expires_at = self
            .expires_at
            .as_deref()
            .map(|s| NaiveDateTime::parse_from_str(s, EXPIRES_AT_FORMAT))
            .transpose()
            .map_err(|e| malformed(format!("expires_at: {e}")))?;

        Ok(Alert {
            id,
            kind: self.kind.parse().map_err(malformed)?,
            priority: self.priority.parse().map_err(malformed)?,
            title: self.title,
            message: self.message,
            subject_employee_id,
            subject_employee_name: self.subject_employee_name,
            read: self.read,
            created_at,
            expires_at,
            identity_key: self.identity_key,
            detail: serde_json::from_str(&self.detail)
                .map_err(|e| malformed(format!("detail: {e}")))?,
        })
    }
}

fn query_alerts(conn: &Connection, filter: &str) -> Result<Vec<Alert>> {
    let sql = format!("SELECT {COLUMNS} FROM alerts {filter} ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], RawAlert::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    rows.into_iter().map(RawAlert::into_alert).collect()
}

fn insert_alert(conn: &Connection, candidate: &AlertCandidate) -> Result<AlertId> {
    let detail = serde_json::to_string(&candidate.detail)?;
    conn.execute(
        "INSERT INTO alerts (
            kind, priority, title, message, subject_employee_id, subject_employee_name,
            is_read, created_at, expires_at, identity_key, detail
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9, ?10)",
        params![
            candidate.kind.as_str(),
            candidate.priority.as_str(),
            candidate.title,
            candidate.message,
            candidate.subject_employee_id.map(|id| id.to_string()),
            candidate.subject_employee_name,
            Utc::now().to_rfc3339(),
            candidate
                .expires_at
                .map(|t| t.format(EXPIRES_AT_FORMAT).to_string()),
            candidate.identity_key,
            detail,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn kind_of(conn: &Connection, id: AlertId) -> Result<Option<AlertKind>> {
    let kind: Option<String> = conn
        .query_row("SELECT kind FROM alerts WHERE id = ?1", [id], |row| row.get(0))
        .optional()?;
    kind.map(|k| k.parse().map_err(|reason| Error::MalformedRow { id, reason }))
        .transpose()
}

pub struct SqliteTransaction<'a> {
    tx: Transaction<'a>,
}

impl AlertTransaction for SqliteTransaction<'_> {
    fn managed_alerts(&mut self) -> Result<Vec<Alert>> {
        query_alerts(
            &self.tx,
            &format!("WHERE kind IN ({})", managed_kinds_sql()),
        )
    }

    fn insert(&mut self, candidate: &AlertCandidate) -> Result<AlertId> {
        insert_alert(&self.tx, candidate)
    }

    fn update(&mut self, id: AlertId, candidate: &AlertCandidate) -> Result<()> {
        let detail = serde_json::to_string(&candidate.detail)?;
        self.tx.execute(
            "UPDATE alerts SET
                priority = ?2, title = ?3, message = ?4, subject_employee_name = ?5,
                expires_at = ?6, detail = ?7, is_read = 0
            WHERE id = ?1",
            params![
                id,
                candidate.priority.as_str(),
                candidate.title,
                candidate.message,
                candidate.subject_employee_name,
                candidate
                    .expires_at
                    .map(|t| t.format(EXPIRES_AT_FORMAT).to_string()),
                detail,
            ],
        )?;
        Ok(())
    }

    fn delete(&mut self, id: AlertId) -> Result<()> {
        self.tx.execute("DELETE FROM alerts WHERE id = ?1", [id])?;
        Ok(())
    }

    fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

impl AlertStore for SqliteAlertStore {
    type Transaction<'a> = SqliteTransaction<'a>;

    fn begin(&mut self) -> Result<SqliteTransaction<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteTransaction { tx })
    }

    fn list(&mut self) -> Result<Vec<Alert>> {
        query_alerts(&self.conn, "")
    }

    fn mark_read(&mut self, id: AlertId) -> Result<bool> {
        let changed = self
            .conn
            .execute("UPDATE alerts SET is_read = 1 WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    fn create_manual(&mut self, alert: &AlertCandidate) -> Result<AlertId> {
        if alert.kind.is_managed() {
            return Err(Error::ManagedKind(alert.kind));
        }
        insert_alert(&self.conn, alert)
    }

    fn delete_manual(&mut self, id: AlertId) -> Result<bool> {
        let tx = self.conn.transaction()?;
        match kind_of(&tx, id)? {
            None => Ok(false),
            Some(kind) if kind.is_managed() => Err(Error::ManagedKind(kind)),
            Some(_) => {
                tx.execute("DELETE FROM alerts WHERE id = ?1", [id])?;
                tx.commit()?;
                Ok(true)
            }
        }
    }
}

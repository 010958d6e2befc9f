//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Subsystems call store methods: they never execute SQL directly.
//!
//! Money columns hold integer cents; timestamps are RFC 3339 text with
//! microsecond precision so that text order is time order.

use crate::{
    command::QueuedCommand,
    error::{DeskError, DeskResult},
    event::ActivityLogEntry,
    money,
    types::Timestamp,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{
    params,
    types::{Type, ValueRef},
    Connection, Row,
};
use rust_decimal::Decimal;

mod agent;
mod duel;
mod sale;

pub use agent::TotalMismatch;
pub use sale::TotalChange;

pub struct DeskStore {
    conn: Connection,
}

impl DeskStore {
    /// Open (or create) the desk database at `path`. SQLite URIs are accepted.
    pub fn open(path: &str) -> DeskResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> DeskResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order. Safe to run repeatedly.
    pub fn migrate(&self) -> DeskResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_sales.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_duels.sql"))?;
        Ok(())
    }

    /// Run `work` inside a named SAVEPOINT. Nests inside an enclosing
    /// savepoint; at the top level it behaves as a transaction.
    /// Everything `work` wrote is rolled back if it fails.
    pub(crate) fn savepoint<T, E>(
        &self,
        name: &str,
        work: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        self.conn.execute_batch(&format!("SAVEPOINT {name}"))?;
        match work(&self.conn) {
            Ok(value) => {
                self.conn.execute_batch(&format!("RELEASE {name}"))?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self
                    .conn
                    .execute_batch(&format!("ROLLBACK TO {name}; RELEASE {name}"))
                {
                    log::error!("store: rollback of {name} failed: {rollback}");
                }
                Err(e)
            }
        }
    }

    // ── Command log ────────────────────────────────────────────

    pub fn insert_command(&self, queued: &QueuedCommand) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO command_log (command_id, command_type, payload, submitted_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                queued.command_id,
                queued.command.type_name(),
                serde_json::to_string(&queued.command)?,
                timestamp_to_sql(&queued.submitted_at),
            ],
        )?;
        Ok(())
    }

    pub fn command_count(&self) -> DeskResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM command_log", [], |row| row.get(0))?;
        Ok(count)
    }

    // ── Activity log ───────────────────────────────────────────

    /// Append one event row; returns its log id.
    pub fn append_activity(&self, entry: &ActivityLogEntry) -> DeskResult<i64> {
        self.conn.execute(
            "INSERT INTO activity_log (command_id, subsystem, event_type, payload, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.command_id,
                entry.subsystem,
                entry.event_type,
                entry.payload,
                timestamp_to_sql(&entry.recorded_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Entries with id greater than `after_id`, oldest first.
    pub fn activity_since(&self, after_id: i64, limit: usize) -> DeskResult<Vec<ActivityLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, command_id, subsystem, event_type, payload, recorded_at
             FROM activity_log WHERE id > ?1
             ORDER BY id ASC LIMIT ?2",
        )?;
        let entries = stmt
            .query_map(params![after_id, limit as i64], |row| {
                Ok(ActivityLogEntry {
                    id:          Some(row.get(0)?),
                    command_id:  row.get(1)?,
                    subsystem:   row.get(2)?,
                    event_type:  row.get(3)?,
                    payload:     row.get(4)?,
                    recorded_at: timestamp_column(row, 5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

// ── Column helpers ─────────────────────────────────────────────

pub(crate) fn timestamp_to_sql(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a cents column. Anything but a non-negative integer is reported
/// as a `CorruptAmount` wrapped in a conversion failure.
pub(crate) fn money_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    match row.get_ref(idx)? {
        ValueRef::Integer(cents) if cents >= 0 => Ok(money::from_cents(cents)),
        other => {
            let column = row.as_ref().column_name(idx).unwrap_or("?").to_string();
            Err(rusqlite::Error::FromSqlConversionFailure(
                idx,
                other.data_type(),
                Box::new(DeskError::CorruptAmount {
                    column,
                    value: format!("{other:?}"),
                }),
            ))
        }
    }
}

/// Cents for an amount about to be written. Sub-cent amounts never reach
/// the store; the ledger rejects them first.
pub(crate) fn cents_for(amount: Decimal, column: &str) -> DeskResult<i64> {
    money::to_cents(amount).ok_or_else(|| DeskError::CorruptAmount {
        column: column.to_string(),
        value:  amount.to_string(),
    })
}

pub(crate) fn text_enum_error(idx: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("unexpected value '{value}'").into(),
    )
}

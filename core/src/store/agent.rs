//! Store methods for agent profiles and their running totals.

use crate::{
    config::normalize_name,
    error::DeskResult,
    money,
    roster_subsystem::AgentProfile,
    types::Role,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{money_column, text_enum_error, timestamp_column, timestamp_to_sql, DeskStore};

/// An agent whose stored total disagrees with the sum of their sales.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalMismatch {
    pub agent_id: String,
    pub stored:   Decimal,
    pub derived:  Decimal,
}

const AGENT_COLUMNS: &str = "agent_id, name, role, sales_total_cents, created_at";

fn agent_from_row(row: &Row<'_>) -> rusqlite::Result<AgentProfile> {
    let role_text: String = row.get(2)?;
    let role = Role::parse(&role_text).ok_or_else(|| text_enum_error(2, &role_text))?;
    Ok(AgentProfile {
        agent_id:    row.get(0)?,
        name:        row.get(1)?,
        role,
        sales_total: money_column(row, 3)?,
        created_at:  timestamp_column(row, 4)?,
    })
}

impl DeskStore {
    pub fn insert_agent(&self, agent: &AgentProfile) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO agent (agent_id, name, name_key, role, sales_total_cents, created_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            params![
                agent.agent_id,
                agent.name.trim(),
                normalize_name(&agent.name),
                agent.role.as_str(),
                timestamp_to_sql(&agent.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn agent(&self, agent_id: &str) -> DeskResult<Option<AgentProfile>> {
        let agent = self
            .conn
            .query_row(
                &format!("SELECT {AGENT_COLUMNS} FROM agent WHERE agent_id = ?1"),
                params![agent_id],
                agent_from_row,
            )
            .optional()?;
        Ok(agent)
    }

    /// Look an agent up by display name, ignoring case and outer whitespace.
    pub fn agent_by_name(&self, name: &str) -> DeskResult<Option<AgentProfile>> {
        let agent = self
            .conn
            .query_row(
                &format!("SELECT {AGENT_COLUMNS} FROM agent WHERE name_key = ?1"),
                params![normalize_name(name)],
                agent_from_row,
            )
            .optional()?;
        Ok(agent)
    }

    /// Every agent, highest total first; ties broken by name.
    pub fn agents_by_total(&self) -> DeskResult<Vec<AgentProfile>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {AGENT_COLUMNS} FROM agent
             ORDER BY sales_total_cents DESC, name_key ASC"
        ))?;
        let agents = stmt
            .query_map([], agent_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(agents)
    }

    /// Just the totals of every agent, as fed to the collective goal.
    pub fn agent_totals(&self) -> DeskResult<Vec<Decimal>> {
        let mut stmt = self.conn.prepare("SELECT sales_total_cents FROM agent")?;
        let totals = stmt
            .query_map([], |row| money_column(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(totals)
    }

    pub fn agent_count(&self) -> DeskResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM agent", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Agents whose stored total no longer equals the sum of their sales.
    pub fn audit_totals(&self) -> DeskResult<Vec<TotalMismatch>> {
        let mut stmt = self.conn.prepare(
            "SELECT a.agent_id, a.sales_total_cents, COALESCE(SUM(s.value_cents), 0)
             FROM agent a LEFT JOIN sale s ON s.agent_id = a.agent_id
             GROUP BY a.agent_id, a.sales_total_cents
             HAVING a.sales_total_cents <> COALESCE(SUM(s.value_cents), 0)
             ORDER BY a.agent_id",
        )?;
        let mismatches = stmt
            .query_map([], |row| {
                Ok(TotalMismatch {
                    agent_id: row.get(0)?,
                    stored:   money_column(row, 1)?,
                    derived:  money_column(row, 2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(mismatches)
    }

    /// Recompute every agent's total from their sales. Returns rows touched.
    pub fn repair_totals(&self) -> DeskResult<usize> {
        let touched = self.savepoint("repair_totals", |conn| {
            conn.execute(
                "UPDATE agent SET sales_total_cents = (
                     SELECT COALESCE(SUM(value_cents), 0) FROM sale
                     WHERE sale.agent_id = agent.agent_id
                 )
                 WHERE sales_total_cents <> (
                     SELECT COALESCE(SUM(value_cents), 0) FROM sale
                     WHERE sale.agent_id = agent.agent_id
                 )",
                [],
            )
        })?;
        if touched > 0 {
            log::warn!("store: repaired {touched} agent totals");
        }
        Ok(touched)
    }
}

/// Current stored total of one agent, inside whatever transaction `conn` is.
pub(super) fn total_in(conn: &Connection, agent_id: &str) -> rusqlite::Result<Decimal> {
    let cents: i64 = conn.query_row(
        "SELECT sales_total_cents FROM agent WHERE agent_id = ?1",
        params![agent_id],
        |row| row.get(0),
    )?;
    Ok(money::from_cents(cents))
}

/// Derive the agent's total from the record set and store it.
pub(super) fn refresh_total_in(conn: &Connection, agent_id: &str) -> rusqlite::Result<Decimal> {
    conn.execute(
        "UPDATE agent SET sales_total_cents = (
             SELECT COALESCE(SUM(value_cents), 0) FROM sale WHERE agent_id = ?1
         )
         WHERE agent_id = ?1",
        params![agent_id],
    )?;
    total_in(conn, agent_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn store_with_agent() -> DeskStore {
        let store = DeskStore::in_memory().unwrap();
        store.migrate().unwrap();
        store
            .insert_agent(&AgentProfile {
                agent_id:    "agent-1".into(),
                name:        "Ana Souza".into(),
                role:        Role::Operator,
                sales_total: Decimal::ZERO,
                created_at:  Utc::now(),
            })
            .unwrap();
        store
    }

    #[test]
    fn audit_detects_and_repair_fixes_tampered_total() {
        let store = store_with_agent();
        store
            .conn
            .execute("UPDATE agent SET sales_total_cents = 500 WHERE agent_id = 'agent-1'", [])
            .unwrap();

        let mismatches = store.audit_totals().unwrap();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].stored, money::from_cents(500));
        assert_eq!(mismatches[0].derived, Decimal::ZERO);

        assert_eq!(store.repair_totals().unwrap(), 1);
        assert!(store.audit_totals().unwrap().is_empty());
    }

    #[test]
    fn non_integer_total_reads_as_corrupt_amount() {
        let store = store_with_agent();
        store
            .conn
            .execute("UPDATE agent SET sales_total_cents = 12.5 WHERE agent_id = 'agent-1'", [])
            .unwrap();

        let err = store.agent("agent-1").unwrap_err();
        assert!(err.to_string().contains("Corrupt amount"), "got {err}");
    }

    #[test]
    fn name_lookup_ignores_case() {
        let store = store_with_agent();
        let found = store.agent_by_name("  ANA souza").unwrap();
        assert_eq!(found.map(|a| a.agent_id), Some("agent-1".to_string()));
    }
}

//! Store methods for duels. A duel row exists only while it is active.

use crate::{duel_subsystem::DuelChallenge, error::DeskResult};
use rusqlite::{params, OptionalExtension, Row};

use super::{cents_for, money_column, timestamp_column, timestamp_to_sql, DeskStore};

const DUEL_COLUMNS: &str = "duel_id, challenger_id, opponent_id, goal_cents, created_at";

fn duel_from_row(row: &Row<'_>) -> rusqlite::Result<DuelChallenge> {
    Ok(DuelChallenge {
        duel_id:       row.get(0)?,
        challenger_id: row.get(1)?,
        opponent_id:   row.get(2)?,
        goal:          money_column(row, 3)?,
        created_at:    timestamp_column(row, 4)?,
    })
}

impl DeskStore {
    pub fn insert_duel(&self, duel: &DuelChallenge) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO duel (duel_id, challenger_id, opponent_id, goal_cents, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                duel.duel_id,
                duel.challenger_id,
                duel.opponent_id,
                cents_for(duel.goal, "duel.goal_cents")?,
                timestamp_to_sql(&duel.created_at),
            ],
        )?;
        Ok(())
    }

    /// Returns false if the duel did not exist.
    pub fn delete_duel(&self, duel_id: &str) -> DeskResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM duel WHERE duel_id = ?1", params![duel_id])?;
        Ok(deleted > 0)
    }

    pub fn duel(&self, duel_id: &str) -> DeskResult<Option<DuelChallenge>> {
        let duel = self
            .conn
            .query_row(
                &format!("SELECT {DUEL_COLUMNS} FROM duel WHERE duel_id = ?1"),
                params![duel_id],
                duel_from_row,
            )
            .optional()?;
        Ok(duel)
    }

    /// The active duel `agent_id` takes part in, on either side.
    pub fn active_duel_for(&self, agent_id: &str) -> DeskResult<Option<DuelChallenge>> {
        let duel = self
            .conn
            .query_row(
                &format!(
                    "SELECT {DUEL_COLUMNS} FROM duel
                     WHERE challenger_id = ?1 OR opponent_id = ?1
                     ORDER BY created_at DESC LIMIT 1"
                ),
                params![agent_id],
                duel_from_row,
            )
            .optional()?;
        Ok(duel)
    }

    pub fn active_duels(&self) -> DeskResult<Vec<DuelChallenge>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DUEL_COLUMNS} FROM duel ORDER BY created_at ASC"
        ))?;
        let duels = stmt
            .query_map([], duel_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(duels)
    }
}

//! Store methods for sales records.
//!
//! Inserting or deleting a sale and refreshing its owner's total happen
//! in one savepoint, so the total always equals the sum of the records.

use crate::{
    error::DeskResult,
    ledger_subsystem::SalesRecord,
    types::ProductKind,
};
use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{
    agent::{refresh_total_in, total_in},
    cents_for, money_column, text_enum_error, timestamp_column, timestamp_to_sql, DeskStore,
};

/// An agent's total before and after a ledger write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalChange {
    pub previous_total: Decimal,
    pub new_total:      Decimal,
}

const SALE_COLUMNS: &str =
    "sale_id, agent_id, client_name, agreement_name, product, value_cents, created_at";

fn sale_from_row(row: &Row<'_>) -> rusqlite::Result<SalesRecord> {
    let product_text: String = row.get(4)?;
    let product =
        ProductKind::parse(&product_text).ok_or_else(|| text_enum_error(4, &product_text))?;
    Ok(SalesRecord {
        sale_id:        row.get(0)?,
        agent_id:       row.get(1)?,
        client_name:    row.get(2)?,
        agreement_name: row.get(3)?,
        product,
        value:          money_column(row, 5)?,
        created_at:     timestamp_column(row, 6)?,
    })
}

impl DeskStore {
    /// Insert a sale and refresh its owner's total.
    pub fn record_sale(&self, sale: &SalesRecord) -> DeskResult<TotalChange> {
        let value_cents = cents_for(sale.value, "sale.value_cents")?;

        self.savepoint("record_sale", |conn| {
            let previous_total = total_in(conn, &sale.agent_id)?;
            conn.execute(
                "INSERT INTO sale (
                    sale_id, agent_id, client_name, agreement_name, product, value_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    sale.sale_id,
                    sale.agent_id,
                    sale.client_name,
                    sale.agreement_name,
                    sale.product.as_str(),
                    value_cents,
                    timestamp_to_sql(&sale.created_at),
                ],
            )?;
            let new_total = refresh_total_in(conn, &sale.agent_id)?;
            Ok(TotalChange { previous_total, new_total })
        })
    }

    /// Delete a sale owned by `agent_id` and refresh the owner's total.
    /// Returns None if no such sale belongs to that agent.
    pub fn delete_sale(&self, sale_id: &str, agent_id: &str) -> DeskResult<Option<TotalChange>> {
        self.savepoint("delete_sale", |conn| {
            let previous_total = total_in(conn, agent_id)?;
            let deleted = conn.execute(
                "DELETE FROM sale WHERE sale_id = ?1 AND agent_id = ?2",
                params![sale_id, agent_id],
            )?;
            if deleted == 0 {
                return Ok(None);
            }
            let new_total = refresh_total_in(conn, agent_id)?;
            Ok(Some(TotalChange { previous_total, new_total }))
        })
    }

    pub fn sale(&self, sale_id: &str) -> DeskResult<Option<SalesRecord>> {
        let sale = self
            .conn
            .query_row(
                &format!("SELECT {SALE_COLUMNS} FROM sale WHERE sale_id = ?1"),
                params![sale_id],
                sale_from_row,
            )
            .optional()?;
        Ok(sale)
    }

    /// An agent's sales, newest first.
    pub fn sales_for_agent(&self, agent_id: &str) -> DeskResult<Vec<SalesRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SALE_COLUMNS} FROM sale WHERE agent_id = ?1
             ORDER BY created_at DESC, rowid DESC"
        ))?;
        let sales = stmt
            .query_map(params![agent_id], sale_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sales)
    }

    pub fn sale_count(&self) -> DeskResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sale", [], |row| row.get(0))?;
        Ok(count)
    }
}

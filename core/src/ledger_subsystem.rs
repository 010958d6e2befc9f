//! Ledger subsystem: records and deletes sales.
//!
//! This subsystem owns the sale table. Every accepted write is followed
//! by an AgentTotalChanged event carrying the owner's total before and
//! after, which progression and duels react to.

use crate::{
    command::DeskCommand,
    error::DeskResult,
    event::DeskEvent,
    money,
    store::TotalChange,
    subsystem::{CommandContext, DeskSubsystem},
    types::{AgentId, ProductKind, SaleId, Timestamp},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub sale_id:        SaleId,
    pub agent_id:       AgentId,
    pub client_name:    String,
    pub agreement_name: String,
    pub product:        ProductKind,
    pub value:          Decimal,
    pub created_at:     Timestamp,
}

/// Fields of a sale as typed into the form, before validation.
pub struct SaleDraft<'a> {
    pub client_name:    &'a str,
    pub agreement_name: &'a str,
    pub value:          Decimal,
}

impl SaleDraft<'_> {
    /// Returns the reason the draft cannot be booked, if any.
    pub fn problem(&self) -> Option<String> {
        if self.client_name.trim().is_empty() {
            return Some("client name must not be blank".into());
        }
        if self.value.is_sign_negative() && !self.value.is_zero() {
            return Some(format!("sale value {} is negative", self.value));
        }
        if money::has_sub_cents(self.value) {
            return Some(format!("sale value {} has more than two decimal places", self.value));
        }
        if money::to_cents(self.value).is_none() {
            return Some(format!("sale value {} is out of range", self.value));
        }
        None
    }
}

#[derive(Default)]
pub struct LedgerSubsystem;

impl LedgerSubsystem {
    pub fn new() -> Self {
        Self
    }

    fn record(
        &self,
        ctx: &CommandContext<'_>,
        agent_id: &str,
        draft: SaleDraft<'_>,
        product: ProductKind,
    ) -> DeskResult<Vec<DeskEvent>> {
        if let Some(reason) = draft.problem() {
            return Ok(vec![reject(ctx, reason)]);
        }
        if ctx.store.agent(agent_id)?.is_none() {
            return Ok(vec![reject(ctx, format!("unknown agent {agent_id}"))]);
        }

        let sale = SalesRecord {
            sale_id:        uuid::Uuid::new_v4().to_string(),
            agent_id:       agent_id.to_string(),
            client_name:    draft.client_name.trim().to_string(),
            agreement_name: draft.agreement_name.trim().to_string(),
            product,
            value:          draft.value.normalize(),
            created_at:     ctx.at,
        };
        let change = ctx.store.record_sale(&sale)?;

        log::info!(
            "ledger: sale {} recorded for {agent_id}: {} ({}), total {} -> {}",
            sale.sale_id,
            money::format_brl(sale.value),
            product.as_str(),
            change.previous_total,
            change.new_total
        );

        Ok(vec![
            DeskEvent::SaleRecorded {
                sale_id:  sale.sale_id,
                agent_id: agent_id.to_string(),
                product,
                value:    sale.value,
            },
            total_changed(agent_id, change),
        ])
    }

    fn delete(
        &self,
        ctx: &CommandContext<'_>,
        agent_id: &str,
        sale_id: &str,
    ) -> DeskResult<Vec<DeskEvent>> {
        let sale = match ctx.store.sale(sale_id)? {
            Some(s) => s,
            None => return Ok(vec![reject(ctx, format!("unknown sale {sale_id}"))]),
        };
        if sale.agent_id != agent_id {
            return Ok(vec![reject(
                ctx,
                format!("sale {sale_id} does not belong to {agent_id}"),
            )]);
        }

        let change = match ctx.store.delete_sale(sale_id, agent_id)? {
            Some(c) => c,
            None => return Ok(vec![reject(ctx, format!("sale {sale_id} already deleted"))]),
        };

        log::info!(
            "ledger: sale {sale_id} deleted for {agent_id}, total {} -> {}",
            change.previous_total,
            change.new_total
        );

        Ok(vec![
            DeskEvent::SaleDeleted {
                sale_id:  sale_id.to_string(),
                agent_id: agent_id.to_string(),
                value:    sale.value,
            },
            total_changed(agent_id, change),
        ])
    }
}

impl DeskSubsystem for LedgerSubsystem {
    fn name(&self) -> &'static str { "ledger" }

    fn update(
        &mut self,
        ctx: &CommandContext<'_>,
        _events_in: &[DeskEvent],
    ) -> DeskResult<Vec<DeskEvent>> {
        match ctx.command {
            DeskCommand::RecordSale {
                agent_id,
                client_name,
                agreement_name,
                product,
                value,
            } => {
                let draft = SaleDraft {
                    client_name,
                    agreement_name,
                    value: *value,
                };
                self.record(ctx, agent_id, draft, *product)
            }
            DeskCommand::DeleteSale { agent_id, sale_id } => self.delete(ctx, agent_id, sale_id),
            _ => Ok(vec![]),
        }
    }
}

fn total_changed(agent_id: &str, change: TotalChange) -> DeskEvent {
    DeskEvent::AgentTotalChanged {
        agent_id:       agent_id.to_string(),
        previous_total: change.previous_total,
        new_total:      change.new_total,
    }
}

fn reject(ctx: &CommandContext<'_>, reason: impl Into<String>) -> DeskEvent {
    let reason = reason.into();
    log::warn!("ledger: command {} rejected: {reason}", ctx.command_id);
    DeskEvent::CommandRejected {
        command_id: ctx.command_id.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft(value: Decimal) -> SaleDraft<'static> {
        SaleDraft { client_name: "Maria", agreement_name: "INSS", value }
    }

    #[test]
    fn valid_drafts_pass() {
        assert_eq!(draft(dec!(0)).problem(), None);
        assert_eq!(draft(dec!(1500.25)).problem(), None);
    }

    #[test]
    fn negative_and_sub_cent_values_are_refused() {
        assert!(draft(dec!(-1)).problem().is_some());
        assert!(draft(dec!(10.001)).problem().is_some());
    }

    #[test]
    fn oversized_values_are_refused_as_out_of_range() {
        let problem = draft(Decimal::MAX).problem().unwrap_or_default();
        assert!(problem.contains("out of range"), "got {problem:?}");
    }

    #[test]
    fn blank_client_is_refused() {
        let blank = SaleDraft { client_name: "  ", agreement_name: "", value: dec!(10) };
        assert!(blank.problem().is_some());
    }
}

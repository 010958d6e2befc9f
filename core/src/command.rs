use crate::types::{AgentId, CommandId, DuelId, ProductKind, Role, SaleId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything a user of the desk can ask for.
/// Variants are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DeskCommand {
    // ── Roster ─────────────────────────────────────
    RegisterAgent {
        name: String,
        role: Role,
    },

    // ── Ledger ─────────────────────────────────────
    RecordSale {
        agent_id:       AgentId,
        client_name:    String,
        agreement_name: String,
        product:        ProductKind,
        value:          Decimal,
    },
    DeleteSale {
        agent_id: AgentId,
        sale_id:  SaleId,
    },

    // ── Duels ──────────────────────────────────────
    OpenDuel {
        challenger_id: AgentId,
        opponent_id:   AgentId,
        goal:          Decimal,
    },
    CloseDuel {
        agent_id: AgentId,
        duel_id:  DuelId,
    },
}

impl DeskCommand {
    /// Stable name used in the command log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RegisterAgent { .. } => "register_agent",
            Self::RecordSale { .. }    => "record_sale",
            Self::DeleteSale { .. }    => "delete_sale",
            Self::OpenDuel { .. }      => "open_duel",
            Self::CloseDuel { .. }     => "close_duel",
        }
    }
}

/// A submitted command as written to the command log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedCommand {
    pub command_id:   CommandId,
    pub submitted_at: Timestamp,
    pub command:      DeskCommand,
}

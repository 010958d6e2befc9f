//! The event bus: everything the desk does is announced as an event.
//!
//! RULE: Subsystems communicate ONLY through events.
//! A subsystem reacts to earlier events of the same command; it never
//! calls into another subsystem.

use crate::calculator::ColonyStage;
use crate::types::{AgentId, CommandId, DuelId, ProductKind, Role, SaleId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Every event emitted while processing a command.
/// Variants are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    // ── Engine events ──────────────────────────────
    CommandReceived {
        command_id:   CommandId,
        command_type: String,
        at:           Timestamp,
    },
    CommandRejected {
        command_id: CommandId,
        reason:     String,
    },

    // ── Roster ─────────────────────────────────────
    AgentRegistered {
        agent_id: AgentId,
        name:     String,
        role:     Role,
    },

    // ── Ledger ─────────────────────────────────────
    SaleRecorded {
        sale_id:  SaleId,
        agent_id: AgentId,
        product:  ProductKind,
        value:    Decimal,
    },
    SaleDeleted {
        sale_id:  SaleId,
        agent_id: AgentId,
        value:    Decimal,
    },
    AgentTotalChanged {
        agent_id:       AgentId,
        previous_total: Decimal,
        new_total:      Decimal,
    },

    // ── Progression ────────────────────────────────
    RankChanged {
        agent_id:  AgentId,
        from_rank: String,
        to_rank:   String,
        promoted:  bool,
    },
    CommissionTierChanged {
        agent_id:      AgentId,
        previous_rate: Decimal,
        new_rate:      Decimal,
    },
    ColonyStageChanged {
        from:               ColonyStage,
        to:                 ColonyStage,
        collective_percent: Decimal,
    },

    // ── Duels ──────────────────────────────────────
    DuelOpened {
        duel_id:       DuelId,
        challenger_id: AgentId,
        opponent_id:   AgentId,
        goal:          Decimal,
    },
    DuelGoalReached {
        duel_id:  DuelId,
        agent_id: AgentId,
        goal:     Decimal,
        total:    Decimal,
    },
    DuelClosed {
        duel_id:   DuelId,
        closed_by: AgentId,
    },
}

impl DeskEvent {
    /// Stable string name, stored in the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CommandReceived { .. }       => "command_received",
            Self::CommandRejected { .. }       => "command_rejected",
            Self::AgentRegistered { .. }       => "agent_registered",
            Self::SaleRecorded { .. }          => "sale_recorded",
            Self::SaleDeleted { .. }           => "sale_deleted",
            Self::AgentTotalChanged { .. }     => "agent_total_changed",
            Self::RankChanged { .. }           => "rank_changed",
            Self::CommissionTierChanged { .. } => "commission_tier_changed",
            Self::ColonyStageChanged { .. }    => "colony_stage_changed",
            Self::DuelOpened { .. }            => "duel_opened",
            Self::DuelGoalReached { .. }       => "duel_goal_reached",
            Self::DuelClosed { .. }            => "duel_closed",
        }
    }
}

/// An activity log row as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id:          Option<i64>,
    pub command_id:  CommandId,
    pub subsystem:   String,
    pub event_type:  String,
    pub payload:     String, // JSON-serialized DeskEvent
    pub recorded_at: Timestamp,
}

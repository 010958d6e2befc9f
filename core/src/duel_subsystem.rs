//! Duel subsystem: head-to-head races to a shared sales goal.
//!
//! An agent takes part in at most one active duel. Duels end only when
//! one of the two parties closes them; reaching the goal is announced
//! with DuelGoalReached but leaves the duel open.

use crate::{
    command::DeskCommand,
    error::DeskResult,
    event::DeskEvent,
    money,
    subsystem::{CommandContext, DeskSubsystem},
    types::{AgentId, DuelId, Timestamp},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelChallenge {
    pub duel_id:       DuelId,
    pub challenger_id: AgentId,
    pub opponent_id:   AgentId,
    pub goal:          Decimal,
    pub created_at:    Timestamp,
}

impl DuelChallenge {
    pub fn involves(&self, agent_id: &str) -> bool {
        self.challenger_id == agent_id || self.opponent_id == agent_id
    }
}

#[derive(Default)]
pub struct DuelSubsystem;

impl DuelSubsystem {
    pub fn new() -> Self {
        Self
    }

    fn open(
        &self,
        ctx: &CommandContext<'_>,
        challenger_id: &str,
        opponent_id: &str,
        goal: Decimal,
    ) -> DeskResult<Vec<DeskEvent>> {
        if challenger_id == opponent_id {
            return Ok(vec![reject(ctx, "an agent cannot duel themselves")]);
        }
        if goal <= Decimal::ZERO {
            return Ok(vec![reject(ctx, format!("duel goal must be positive, got {goal}"))]);
        }
        if money::has_sub_cents(goal) {
            return Ok(vec![reject(ctx, format!("duel goal {goal} has more than two decimal places"))]);
        }
        if money::to_cents(goal).is_none() {
            return Ok(vec![reject(ctx, format!("duel goal {goal} is out of range"))]);
        }
        for agent_id in [challenger_id, opponent_id] {
            if ctx.store.agent(agent_id)?.is_none() {
                return Ok(vec![reject(ctx, format!("unknown agent {agent_id}"))]);
            }
            if let Some(active) = ctx.store.active_duel_for(agent_id)? {
                return Ok(vec![reject(
                    ctx,
                    format!("{agent_id} is already in duel {}", active.duel_id),
                )]);
            }
        }

        let duel = DuelChallenge {
            duel_id:       uuid::Uuid::new_v4().to_string(),
            challenger_id: challenger_id.to_string(),
            opponent_id:   opponent_id.to_string(),
            goal:          goal.normalize(),
            created_at:    ctx.at,
        };
        ctx.store.insert_duel(&duel)?;

        log::info!(
            "duel: {} opened, {challenger_id} vs {opponent_id} to {}",
            duel.duel_id,
            money::format_brl(duel.goal)
        );

        Ok(vec![DeskEvent::DuelOpened {
            duel_id:       duel.duel_id,
            challenger_id: duel.challenger_id,
            opponent_id:   duel.opponent_id,
            goal:          duel.goal,
        }])
    }

    fn close(
        &self,
        ctx: &CommandContext<'_>,
        agent_id: &str,
        duel_id: &str,
    ) -> DeskResult<Vec<DeskEvent>> {
        let duel = match ctx.store.duel(duel_id)? {
            Some(d) => d,
            None => return Ok(vec![reject(ctx, format!("unknown duel {duel_id}"))]),
        };
        if !duel.involves(agent_id) {
            return Ok(vec![reject(
                ctx,
                format!("{agent_id} is not a party to duel {duel_id}"),
            )]);
        }

        ctx.store.delete_duel(duel_id)?;
        log::info!("duel: {duel_id} closed by {agent_id}");

        Ok(vec![DeskEvent::DuelClosed {
            duel_id:   duel_id.to_string(),
            closed_by: agent_id.to_string(),
        }])
    }

    /// Announce parties that crossed their duel goal with this write.
    fn goals_reached(
        &self,
        ctx: &CommandContext<'_>,
        agent_id: &str,
        previous: Decimal,
        new: Decimal,
    ) -> DeskResult<Option<DeskEvent>> {
        let duel = match ctx.store.active_duel_for(agent_id)? {
            Some(d) => d,
            None => return Ok(None),
        };
        if previous >= duel.goal || new < duel.goal {
            return Ok(None);
        }

        log::info!(
            "duel: {agent_id} reached the goal of duel {} ({})",
            duel.duel_id,
            money::format_brl(duel.goal)
        );
        Ok(Some(DeskEvent::DuelGoalReached {
            duel_id:  duel.duel_id,
            agent_id: agent_id.to_string(),
            goal:     duel.goal,
            total:    new,
        }))
    }
}

impl DeskSubsystem for DuelSubsystem {
    fn name(&self) -> &'static str { "duel" }

    fn update(
        &mut self,
        ctx: &CommandContext<'_>,
        events_in: &[DeskEvent],
    ) -> DeskResult<Vec<DeskEvent>> {
        let mut out_events = match ctx.command {
            DeskCommand::OpenDuel { challenger_id, opponent_id, goal } => {
                self.open(ctx, challenger_id, opponent_id, *goal)?
            }
            DeskCommand::CloseDuel { agent_id, duel_id } => self.close(ctx, agent_id, duel_id)?,
            _ => Vec::new(),
        };

        for event in events_in {
            if let DeskEvent::AgentTotalChanged { agent_id, previous_total, new_total } = event {
                if let Some(reached) =
                    self.goals_reached(ctx, agent_id, *previous_total, *new_total)?
                {
                    out_events.push(reached);
                }
            }
        }

        Ok(out_events)
    }
}

fn reject(ctx: &CommandContext<'_>, reason: impl Into<String>) -> DeskEvent {
    let reason = reason.into();
    log::warn!("duel: command {} rejected: {reason}", ctx.command_id);
    DeskEvent::CommandRejected {
        command_id: ctx.command_id.clone(),
        reason,
    }
}

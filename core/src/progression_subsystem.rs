//! Progression subsystem: announces rank, commission tier and colony
//! stage changes caused by ledger writes.
//!
//! Holds no state of its own: it compares the calculator's answer for the
//! total before a write with the answer for the total after it.

use crate::{
    calculator::{colony_stage, compute_collective_progress, compute_commission, compute_rank},
    config::DeskConfig,
    error::DeskResult,
    event::DeskEvent,
    subsystem::{CommandContext, DeskSubsystem},
};
use rust_decimal::Decimal;

pub struct ProgressionSubsystem {
    config: DeskConfig,
}

impl ProgressionSubsystem {
    pub fn new(config: DeskConfig) -> Self {
        Self { config }
    }

    fn agent_changes(&self, agent_id: &str, previous: Decimal, new: Decimal) -> Vec<DeskEvent> {
        let mut events = Vec::new();

        let rank_before = compute_rank(previous, &self.config.ranks);
        let rank_after = compute_rank(new, &self.config.ranks);
        if rank_before.current_tier != rank_after.current_tier {
            let promoted = rank_after.current_tier.threshold > rank_before.current_tier.threshold;
            log::info!(
                "progression: {agent_id} {} '{}' -> '{}'",
                if promoted { "promoted" } else { "demoted" },
                rank_before.current_tier.name,
                rank_after.current_tier.name
            );
            events.push(DeskEvent::RankChanged {
                agent_id:  agent_id.to_string(),
                from_rank: rank_before.current_tier.name,
                to_rank:   rank_after.current_tier.name,
                promoted,
            });
        }

        let rate_before = compute_commission(previous, &self.config.commissions).rate;
        let rate_after = compute_commission(new, &self.config.commissions).rate;
        if rate_before != rate_after {
            log::info!("progression: {agent_id} commission rate {rate_before} -> {rate_after}");
            events.push(DeskEvent::CommissionTierChanged {
                agent_id:      agent_id.to_string(),
                previous_rate: rate_before,
                new_rate:      rate_after,
            });
        }

        events
    }

    fn colony_change(
        &self,
        ctx: &CommandContext<'_>,
        team_delta: Decimal,
    ) -> DeskResult<Option<DeskEvent>> {
        let totals_now = ctx.store.agent_totals()?;
        let team_now: Decimal = totals_now.iter().copied().sum();
        let team_before = team_now - team_delta;

        let goal = self.config.collective_goal;
        let percent_before = compute_collective_progress(&[team_before], goal);
        let percent_now = compute_collective_progress(&totals_now, goal);

        let from = colony_stage(percent_before, &self.config.colony_stages);
        let to = colony_stage(percent_now, &self.config.colony_stages);
        if from == to {
            return Ok(None);
        }

        log::info!(
            "progression: colony stage {} -> {} at {percent_now:.2}%",
            from.as_str(),
            to.as_str()
        );
        Ok(Some(DeskEvent::ColonyStageChanged {
            from,
            to,
            collective_percent: percent_now,
        }))
    }
}

impl DeskSubsystem for ProgressionSubsystem {
    fn name(&self) -> &'static str { "progression" }

    fn update(
        &mut self,
        ctx: &CommandContext<'_>,
        events_in: &[DeskEvent],
    ) -> DeskResult<Vec<DeskEvent>> {
        let mut out_events = Vec::new();
        let mut team_delta = Decimal::ZERO;

        for event in events_in {
            if let DeskEvent::AgentTotalChanged { agent_id, previous_total, new_total } = event {
                out_events.extend(self.agent_changes(agent_id, *previous_total, *new_total));
                team_delta += *new_total - *previous_total;
            }
        }

        if !team_delta.is_zero() {
            if let Some(event) = self.colony_change(ctx, team_delta)? {
                out_events.push(event);
            }
        }

        Ok(out_events)
    }
}

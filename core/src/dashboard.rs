//! Read-only views assembled from the store and the calculator.
//!
//! These are what a screen renders: one agent's own dashboard, the
//! supervisor's team roster, and the standing of an active duel.

use crate::{
    calculator::{
        colony_stage, compute_collective_progress, compute_commission, compute_duel_progress,
        compute_rank, ColonyStage, CommissionOutcome, RankOutcome,
    },
    config::DeskConfig,
    duel_subsystem::DuelChallenge,
    error::{DeskError, DeskResult},
    ledger_subsystem::SalesRecord,
    roster_subsystem::AgentProfile,
    store::DeskStore,
    types::Role,
};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct OperatorDashboard {
    pub agent:              AgentProfile,
    /// Newest first.
    pub sales:              Vec<SalesRecord>,
    pub commission:         CommissionOutcome,
    pub rank:               RankOutcome,
    pub team_total:         Decimal,
    pub collective_percent: Decimal,
    pub colony_stage:       ColonyStage,
    pub duel:               Option<DuelStanding>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamRosterRow {
    pub agent:           AgentProfile,
    pub rank_name:       String,
    pub commission_rate: Decimal,
    /// Top of the whole team, and only once they have sold something.
    pub is_leader:       bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamView {
    /// Highest total first, filtered by the search text if one was given.
    pub rows:               Vec<TeamRosterRow>,
    pub team_total:         Decimal,
    pub collective_percent: Decimal,
    pub colony_stage:       ColonyStage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuelLead {
    Challenger,
    Opponent,
    Level,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuelStanding {
    pub duel:               DuelChallenge,
    pub challenger_total:   Decimal,
    pub opponent_total:     Decimal,
    pub challenger_percent: Decimal,
    pub opponent_percent:   Decimal,
    pub lead:               DuelLead,
}

pub fn operator_dashboard(
    store: &DeskStore,
    config: &DeskConfig,
    agent_id: &str,
) -> DeskResult<OperatorDashboard> {
    let agent = store
        .agent(agent_id)?
        .ok_or_else(|| DeskError::AgentNotFound { agent_id: agent_id.to_string() })?;
    let sales = store.sales_for_agent(agent_id)?;

    let totals = store.agent_totals()?;
    let team_total: Decimal = totals.iter().copied().sum();
    let collective_percent = compute_collective_progress(&totals, config.collective_goal);

    Ok(OperatorDashboard {
        commission: compute_commission(agent.sales_total, &config.commissions),
        rank: compute_rank(agent.sales_total, &config.ranks),
        team_total,
        collective_percent,
        colony_stage: colony_stage(collective_percent, &config.colony_stages),
        duel: duel_standing_for(store, agent_id)?,
        agent,
        sales,
    })
}

/// The supervisor's roster. Refused for operators.
pub fn team_view(
    store: &DeskStore,
    config: &DeskConfig,
    viewer_id: &str,
    search: Option<&str>,
) -> DeskResult<TeamView> {
    let viewer = store
        .agent(viewer_id)?
        .ok_or_else(|| DeskError::AgentNotFound { agent_id: viewer_id.to_string() })?;
    if viewer.role != Role::Supervisor {
        return Err(DeskError::Forbidden {
            agent_id: viewer_id.to_string(),
            action:   "view the team roster".into(),
        });
    }

    let agents = store.agents_by_total()?;
    let totals: Vec<Decimal> = agents.iter().map(|a| a.sales_total).collect();
    let team_total: Decimal = totals.iter().copied().sum();
    let collective_percent = compute_collective_progress(&totals, config.collective_goal);

    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let rows = agents
        .into_iter()
        .enumerate()
        .filter(|(_, agent)| match &needle {
            Some(n) => agent.name.to_lowercase().contains(n.as_str()),
            None    => true,
        })
        .map(|(index, agent)| TeamRosterRow {
            rank_name:       compute_rank(agent.sales_total, &config.ranks).current_tier.name,
            commission_rate: compute_commission(agent.sales_total, &config.commissions).rate,
            is_leader:       index == 0 && agent.sales_total > Decimal::ZERO,
            agent,
        })
        .collect();

    Ok(TeamView {
        rows,
        team_total,
        collective_percent,
        colony_stage: colony_stage(collective_percent, &config.colony_stages),
    })
}

/// Standing of the active duel `agent_id` is in, if any.
pub fn duel_standing_for(store: &DeskStore, agent_id: &str) -> DeskResult<Option<DuelStanding>> {
    let duel = match store.active_duel_for(agent_id)? {
        Some(d) => d,
        None => return Ok(None),
    };
    let total_of = |id: &str| -> DeskResult<Decimal> {
        Ok(store.agent(id)?.map(|a| a.sales_total).unwrap_or_default())
    };
    let challenger_total = total_of(&duel.challenger_id)?;
    let opponent_total = total_of(&duel.opponent_id)?;
    Ok(Some(duel_standing(duel, challenger_total, opponent_total)))
}

/// Compare both sides of a duel against its shared goal.
pub fn duel_standing(
    duel: DuelChallenge,
    challenger_total: Decimal,
    opponent_total: Decimal,
) -> DuelStanding {
    let lead = match challenger_total.cmp(&opponent_total) {
        std::cmp::Ordering::Greater => DuelLead::Challenger,
        std::cmp::Ordering::Less    => DuelLead::Opponent,
        std::cmp::Ordering::Equal   => DuelLead::Level,
    };
    DuelStanding {
        challenger_percent: compute_duel_progress(challenger_total, duel.goal),
        opponent_percent: compute_duel_progress(opponent_total, duel.goal),
        challenger_total,
        opponent_total,
        lead,
        duel,
    }
}

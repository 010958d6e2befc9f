//! Roster subsystem: agent registration and role assignment.
//!
//! Operators register freely. The supervisor role is reserved for the
//! names on the configured supervisor roster.

use crate::{
    command::DeskCommand,
    config::DeskConfig,
    error::DeskResult,
    event::DeskEvent,
    subsystem::{CommandContext, DeskSubsystem},
    types::{AgentId, Role, Timestamp},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub agent_id:    AgentId,
    pub name:        String,
    pub role:        Role,
    /// Sum of the agent's sales, maintained by the store.
    pub sales_total: Decimal,
    pub created_at:  Timestamp,
}

pub struct RosterSubsystem {
    config: DeskConfig,
}

impl RosterSubsystem {
    pub fn new(config: DeskConfig) -> Self {
        Self { config }
    }

    fn register(
        &self,
        ctx: &CommandContext<'_>,
        name: &str,
        role: Role,
    ) -> DeskResult<Vec<DeskEvent>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(vec![reject(ctx, "agent name must not be blank")]);
        }
        if role == Role::Supervisor && !self.config.is_supervisor_allowed(name) {
            log::warn!("roster: supervisor registration refused for '{name}'");
            return Ok(vec![reject(ctx, format!("'{name}' is not on the supervisor roster"))]);
        }
        if self.store_has_name(ctx, name)? {
            return Ok(vec![reject(ctx, format!("an agent named '{name}' already exists"))]);
        }

        let profile = AgentProfile {
            agent_id:    uuid::Uuid::new_v4().to_string(),
            name:        name.to_string(),
            role,
            sales_total: Decimal::ZERO,
            created_at:  ctx.at,
        };
        ctx.store.insert_agent(&profile)?;

        log::info!(
            "roster: registered {} '{}' as {}",
            role.as_str(),
            profile.name,
            profile.agent_id
        );

        Ok(vec![DeskEvent::AgentRegistered {
            agent_id: profile.agent_id,
            name:     profile.name,
            role,
        }])
    }

    fn store_has_name(&self, ctx: &CommandContext<'_>, name: &str) -> DeskResult<bool> {
        Ok(ctx.store.agent_by_name(name)?.is_some())
    }
}

impl DeskSubsystem for RosterSubsystem {
    fn name(&self) -> &'static str { "roster" }

    fn update(
        &mut self,
        ctx: &CommandContext<'_>,
        _events_in: &[DeskEvent],
    ) -> DeskResult<Vec<DeskEvent>> {
        match ctx.command {
            DeskCommand::RegisterAgent { name, role } => self.register(ctx, name, *role),
            _ => Ok(vec![]),
        }
    }
}

fn reject(ctx: &CommandContext<'_>, reason: impl Into<String>) -> DeskEvent {
    let reason = reason.into();
    log::warn!("roster: command {} rejected: {reason}", ctx.command_id);
    DeskEvent::CommandRejected {
        command_id: ctx.command_id.clone(),
        reason,
    }
}

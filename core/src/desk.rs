//! The sales desk: accepts commands and fans them out to subsystems.
//!
//! EXECUTION ORDER (never reordered):
//!   1. Roster subsystem       (agent registration)
//!   2. Ledger subsystem       (sales, running totals)
//!   3. Progression subsystem  (rank / commission / colony changes)
//!   4. Duel subsystem         (duel lifecycle, goal crossings)
//!
//! RULES:
//!   - Subsystems run in registration order, once per command.
//!   - Each subsystem sees the events emitted before it for that command.
//!   - No subsystem calls another subsystem's functions directly.
//!   - Every command and every event is written to the store.

use crate::{
    clock::DeskClock,
    command::{DeskCommand, QueuedCommand},
    config::DeskConfig,
    dashboard::{self, DuelStanding, OperatorDashboard, TeamView},
    duel_subsystem::DuelSubsystem,
    error::{DeskError, DeskResult},
    event::{ActivityLogEntry, DeskEvent},
    ledger_subsystem::{LedgerSubsystem, SalesRecord},
    progression_subsystem::ProgressionSubsystem,
    roster_subsystem::{AgentProfile, RosterSubsystem},
    store::{DeskStore, TotalMismatch},
    subsystem::{CommandContext, DeskSubsystem},
};

pub struct SalesDesk {
    pub config: DeskConfig,
    pub clock:  DeskClock,
    subsystems: Vec<Box<dyn DeskSubsystem>>,
    store:      DeskStore,
}

impl SalesDesk {
    pub fn new(config: DeskConfig, store: DeskStore, clock: DeskClock) -> Self {
        Self {
            config,
            clock,
            subsystems: Vec::new(),
            store,
        }
    }

    /// Build a fully wired desk with all subsystems registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: DeskConfig, store: DeskStore, clock: DeskClock) -> Self {
        let mut desk = SalesDesk::new(config.clone(), store, clock);

        // Fixed execution order.
        desk.register(Box::new(RosterSubsystem::new(config.clone())));
        desk.register(Box::new(LedgerSubsystem::new()));
        desk.register(Box::new(ProgressionSubsystem::new(config)));
        desk.register(Box::new(DuelSubsystem::new()));
        desk
    }

    /// Default config, migrated in-memory store, stepped clock.
    pub fn build_test() -> DeskResult<Self> {
        let store = DeskStore::in_memory()?;
        store.migrate()?;
        Ok(Self::build(DeskConfig::default(), store, DeskClock::fixed_test()))
    }

    /// Register a subsystem. Call in the documented execution order.
    pub fn register(&mut self, subsystem: Box<dyn DeskSubsystem>) {
        self.subsystems.push(subsystem);
    }

    /// Process one command through every subsystem.
    ///
    /// Validation problems come back as a CommandRejected event, not as
    /// an error; errors are reserved for storage failures. A command is
    /// applied as a whole: if any step fails, none of its writes, log
    /// rows or events are kept.
    pub fn submit(&mut self, command: DeskCommand) -> DeskResult<Vec<DeskEvent>> {
        let queued = QueuedCommand {
            command_id:   uuid::Uuid::new_v4().to_string(),
            submitted_at: self.clock.now(),
            command,
        };
        let store = &self.store;
        let subsystems = &mut self.subsystems;

        let events = store.savepoint("desk_command", |_| {
            store.insert_command(&queued)?;

            let received = DeskEvent::CommandReceived {
                command_id:   queued.command_id.clone(),
                command_type: queued.command.type_name().to_string(),
                at:           queued.submitted_at,
            };
            log_event_to(store, &queued, "desk", &received)?;
            let mut events = vec![received];

            let ctx = CommandContext {
                command_id: &queued.command_id,
                command:    &queued.command,
                at:         queued.submitted_at,
                store,
            };

            for subsystem in subsystems.iter_mut() {
                let new_events = subsystem.update(&ctx, &events)?;
                for event in &new_events {
                    log_event_to(store, &queued, subsystem.name(), event)?;
                }
                events.extend(new_events);
            }
            Ok::<_, DeskError>(events)
        });

        let events = match events {
            Ok(events) => events,
            Err(e) => {
                log::error!(
                    "desk: command {} ({}) rolled back: {e}",
                    queued.command_id,
                    queued.command.type_name()
                );
                return Err(e);
            }
        };

        log::debug!(
            "desk: command {} ({}) produced {} events",
            queued.command_id,
            queued.command.type_name(),
            events.len()
        );
        Ok(events)
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn agent(&self, agent_id: &str) -> DeskResult<AgentProfile> {
        self.store
            .agent(agent_id)?
            .ok_or_else(|| DeskError::AgentNotFound { agent_id: agent_id.to_string() })
    }

    pub fn agents_by_total(&self) -> DeskResult<Vec<AgentProfile>> {
        self.store.agents_by_total()
    }

    pub fn sales_for(&self, agent_id: &str) -> DeskResult<Vec<SalesRecord>> {
        self.store.sales_for_agent(agent_id)
    }

    pub fn operator_dashboard(&self, agent_id: &str) -> DeskResult<OperatorDashboard> {
        dashboard::operator_dashboard(&self.store, &self.config, agent_id)
    }

    pub fn team_view(&self, viewer_id: &str, search: Option<&str>) -> DeskResult<TeamView> {
        dashboard::team_view(&self.store, &self.config, viewer_id, search)
    }

    pub fn duel_standing(&self, agent_id: &str) -> DeskResult<Option<DuelStanding>> {
        dashboard::duel_standing_for(&self.store, agent_id)
    }

    pub fn activity_since(&self, after_id: i64, limit: usize) -> DeskResult<Vec<ActivityLogEntry>> {
        self.store.activity_since(after_id, limit)
    }

    pub fn audit_totals(&self) -> DeskResult<Vec<TotalMismatch>> {
        self.store.audit_totals()
    }

    /// Direct store access for tooling and tests.
    pub fn store(&self) -> &DeskStore {
        &self.store
    }
}

fn log_event_to(
    store: &DeskStore,
    queued: &QueuedCommand,
    subsystem: &str,
    event: &DeskEvent,
) -> DeskResult<()> {
    let entry = ActivityLogEntry {
        id:          None,
        command_id:  queued.command_id.clone(),
        subsystem:   subsystem.to_string(),
        event_type:  event.type_name().to_string(),
        payload:     serde_json::to_string(event)?,
        recorded_at: queued.submitted_at,
    };
    store.append_activity(&entry)?;
    Ok(())
}

/// The first rejection reason among `events`, if the command was refused.
pub fn rejection(events: &[DeskEvent]) -> Option<&str> {
    events.iter().find_map(|e| match e {
        DeskEvent::CommandRejected { reason, .. } => Some(reason.as_str()),
        _ => None,
    })
}


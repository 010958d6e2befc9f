//! Subsystem trait.
//!
//! RULE: Every subsystem implements DeskSubsystem.
//! The desk calls update() on each registered subsystem in
//! registration order, once per submitted command.
//! The order is fixed and documented in desk.rs.

use crate::{
    command::DeskCommand,
    error::DeskResult,
    event::DeskEvent,
    store::DeskStore,
    types::{CommandId, Timestamp},
};

/// What a subsystem gets to see about the command being processed.
pub struct CommandContext<'a> {
    pub command_id: &'a CommandId,
    pub command:    &'a DeskCommand,
    /// Time the command was accepted; used for every record it creates.
    pub at:         Timestamp,
    pub store:      &'a DeskStore,
}

/// The contract every subsystem must fulfill.
pub trait DeskSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// Called once per command by the desk.
    ///
    /// - `ctx`:       the command and the shared store
    /// - `events_in`: events emitted by earlier subsystems for this command
    ///
    /// Returns the new events to append to the command's event list.
    fn update(
        &mut self,
        ctx: &CommandContext<'_>,
        events_in: &[DeskEvent],
    ) -> DeskResult<Vec<DeskEvent>>;
}

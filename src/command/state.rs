//! Multi-turn command state
//!
//! Idle -> AwaitingParameter when a matched command lacks a required slot;
//! back to Idle when the next turn fills it, on explicit cancel, when a new
//! command supersedes it, or when the expiry policy drops it.

use crate::command::model::Command;
use crate::command::session::Session;
use crate::core::config::PendingExpiry;
use crate::core::error::{LaiaError, Result};
use crate::core::types::Turn;

/// A command waiting for exactly one more turn of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommand {
    /// The incomplete command, with the slots gathered so far
    pub command: Command,
    pub requested_slot: String,
    pub opened_at_turn: Turn,
}

/// Tracks at most one pending command per session
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandStateManager {
    expiry: PendingExpiry,
}

impl CommandStateManager {
    pub fn new(expiry: PendingExpiry) -> Self {
        Self { expiry }
    }

    pub fn has_active(&self, session: &Session) -> bool {
        session.pending.is_some()
    }

    /// Enter AwaitingParameter. Any older pending command is superseded.
    pub fn open(&self, session: &mut Session, command: Command, slot: &str) {
        if let Some(old) = session.pending.take() {
            tracing::debug!(
                superseded = %old.command.name,
                by = %command.name,
                "Replacing pending command"
            );
        }
        tracing::debug!(command = %command.name, slot, turn = session.turn(), "Awaiting parameter");
        session.pending = Some(PendingCommand {
            command,
            requested_slot: slot.to_string(),
            opened_at_turn: session.turn(),
        });
    }

    /// Consume the pending command, storing `value` in its requested slot.
    ///
    /// Calling this while Idle is a programmer error.
    pub fn fill(&self, session: &mut Session, value: &str) -> Result<Command> {
        let pending = session.pending.take().ok_or(LaiaError::NoPendingCommand)?;
        let mut command = pending.command;
        command
            .slots
            .insert(pending.requested_slot, value.trim().to_string());
        Ok(command)
    }

    /// Drop the pending command. Returns whether one existed.
    pub fn cancel(&self, session: &mut Session) -> bool {
        match session.pending.take() {
            Some(pending) => {
                tracing::debug!(command = %pending.command.name, "Pending command cancelled");
                true
            }
            None => false,
        }
    }

    /// Apply the expiry policy as of the session's current turn.
    pub fn expire_stale(&self, session: &mut Session) -> bool {
        let PendingExpiry::AfterTurns(limit) = self.expiry else {
            return false;
        };
        let current = session.turn();
        let stale = session
            .pending
            .as_ref()
            .is_some_and(|p| current.saturating_sub(p.opened_at_turn) > limit);
        if stale {
            tracing::info!(limit, "Pending command expired");
            session.pending = None;
        }
        stale
    }
}

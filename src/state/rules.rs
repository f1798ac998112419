//! Rules engine collaborator.
//!
//! The core never interprets positions or moves. It asks the engine for the
//! initial position, hands it decoded moves, and asks whether the result ends
//! the match.

use std::fmt;

use serde::de::DeserializeOwned;

use super::event::{Outcome, OutcomeReason, Side};

/// Engine refused a move in the current position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("move rejected: {reason}")]
pub struct MoveRejected {
    pub reason: String,
}

impl MoveRejected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Whether a position ends the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalStatus {
    Ongoing,
    Terminal {
        winner: Option<Side>,
        reason: OutcomeReason,
    },
}

impl TerminalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal { .. })
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match *self {
            Self::Ongoing => None,
            Self::Terminal { winner, reason } => Some(Outcome { winner, reason }),
        }
    }
}

/// A game's rules. Each session gets its own clone.
pub trait RulesEngine: Clone + fmt::Debug {
    /// Opaque game state.
    type Position: Clone + fmt::Debug;

    /// Move descriptor, decoded from the client's JSON payload.
    type Move: DeserializeOwned;

    fn initial_position(&self) -> Self::Position;

    /// Apply `mv` for `side`, returning the new position.
    fn apply(
        &self,
        position: &Self::Position,
        side: Side,
        mv: &Self::Move,
    ) -> Result<Self::Position, MoveRejected>;

    fn terminal_status(&self, position: &Self::Position) -> TerminalStatus;

    /// Client-facing rendering of a position.
    fn position_to_json(&self, position: &Self::Position) -> serde_json::Value;
}

//! Test doubles: a recording channel and a tiny countdown game.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;

use crate::state::{
    Channel, ChannelError, MoveRejected, OutcomeReason, RulesEngine, ServerEvent, Side,
    TerminalStatus,
};

/// Channel that records every delivered event.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    events: Mutex<Vec<ServerEvent>>,
    closed: AtomicBool,
}

impl RecordingChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Simulate a half-closed connection: later sends fail.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<ServerEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Drain recorded events.
    pub fn take(&self) -> Vec<ServerEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    pub fn count(&self, name: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }

    pub fn last(&self) -> Option<ServerEvent> {
        self.events.lock().unwrap().last().cloned()
    }
}

impl Channel for RecordingChannel {
    fn send(&self, event: &ServerEvent) -> Result<(), ChannelError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ChannelError::Closed);
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Players alternately take 1-3 tokens from a pile; whoever takes the last
/// token wins by "checkmate". Reaching `stalemate_at` ends in a draw.
#[derive(Debug, Clone)]
pub struct CountdownRules {
    pub start: u32,
    pub stalemate_at: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownPosition {
    pub remaining: u32,
    pub last_mover: Option<Side>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountdownMove {
    pub take: u32,
}

impl CountdownRules {
    pub fn new(start: u32) -> Self {
        Self {
            start,
            stalemate_at: None,
        }
    }

    pub fn with_stalemate_at(mut self, remaining: u32) -> Self {
        self.stalemate_at = Some(remaining);
        self
    }
}

impl RulesEngine for CountdownRules {
    type Position = CountdownPosition;
    type Move = CountdownMove;

    fn initial_position(&self) -> CountdownPosition {
        CountdownPosition {
            remaining: self.start,
            last_mover: None,
        }
    }

    fn apply(
        &self,
        position: &CountdownPosition,
        side: Side,
        mv: &CountdownMove,
    ) -> Result<CountdownPosition, MoveRejected> {
        if mv.take == 0 || mv.take > 3 || mv.take > position.remaining {
            return Err(MoveRejected::new(format!("cannot take {}", mv.take)));
        }
        Ok(CountdownPosition {
            remaining: position.remaining - mv.take,
            last_mover: Some(side),
        })
    }

    fn terminal_status(&self, position: &CountdownPosition) -> TerminalStatus {
        if position.remaining == 0 {
            return TerminalStatus::Terminal {
                winner: position.last_mover,
                reason: OutcomeReason::Checkmate,
            };
        }
        if self.stalemate_at == Some(position.remaining) {
            return TerminalStatus::Terminal {
                winner: None,
                reason: OutcomeReason::InsufficientMaterial,
            };
        }
        TerminalStatus::Ongoing
    }

    fn position_to_json(&self, position: &CountdownPosition) -> serde_json::Value {
        serde_json::json!({ "remaining": position.remaining })
    }
}

//! MatchPlay State Library
//!
//! This crate provides the matchmaking and match-session core for MatchPlay,
//! a server that pairs anonymous players into two-party real-time matches.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Matchmaking Queue** - Participants wait first come first served; every
//!   admission pairs the two oldest until fewer than two remain.
//!
//! - **Match Sessions** - One state machine per pair: relays moves through a
//!   pluggable rules engine, handles resignation, draw offers and abandonment,
//!   and completes exactly once.
//!
//! - **Coordinator** - Routes each participant's events to the queue or to the
//!   session that owns them, and reclaims sessions when they end.
//!
//! # Design Principles
//!
//! 1. **No networking** - The transport hands in events and a [`state::Channel`]
//!    per connection; this crate never does I/O.
//!
//! 2. **No ambient state** - One explicitly constructed coordinator per server.
//!
//! 3. **Completed sessions carry no players** - A finished session keeps only
//!    its outcome.
//!
//! 4. **Protocol violations are not errors** - Out-of-turn moves, stale draw
//!    answers and late actions are logged and dropped.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{mpsc, Arc};
//!
//! use matchplay_state::state::{
//!     ClientEvent, DisplayData, MatchCoordinator, MoveRejected, OutcomeReason, RulesEngine,
//!     ServerEvent, Side, TerminalStatus,
//! };
//!
//! /// Race to ten: each move adds 1 or 2.
//! #[derive(Debug, Clone)]
//! struct RaceToTen;
//!
//! impl RulesEngine for RaceToTen {
//!     type Position = u32;
//!     type Move = u32;
//!
//!     fn initial_position(&self) -> u32 {
//!         0
//!     }
//!
//!     fn apply(&self, total: &u32, _side: Side, step: &u32) -> Result<u32, MoveRejected> {
//!         match *step {
//!             1 | 2 => Ok(total + step),
//!             _ => Err(MoveRejected::new("step must be 1 or 2")),
//!         }
//!     }
//!
//!     fn terminal_status(&self, total: &u32) -> TerminalStatus {
//!         if *total >= 10 {
//!             TerminalStatus::Terminal { winner: None, reason: OutcomeReason::Draw }
//!         } else {
//!             TerminalStatus::Ongoing
//!         }
//!     }
//!
//!     fn position_to_json(&self, total: &u32) -> serde_json::Value {
//!         serde_json::json!(total)
//!     }
//! }
//!
//! let mut coordinator = MatchCoordinator::new(RaceToTen);
//!
//! let (alice_tx, alice_rx) = mpsc::channel::<ServerEvent>();
//! let (bob_tx, _bob_rx) = mpsc::channel::<ServerEvent>();
//! coordinator.connect("alice", Arc::new(alice_tx));
//! coordinator.connect("bob", Arc::new(bob_tx));
//!
//! coordinator.handle_event("alice", ClientEvent::Join(DisplayData::new("Alice")));
//! coordinator.handle_event("bob", ClientEvent::Join(DisplayData::new("Bob")));
//! assert_eq!(coordinator.queue_len(), 0);
//! assert_eq!(coordinator.session_count(), 1);
//!
//! coordinator.handle_event("alice", ClientEvent::Move(serde_json::json!(2)));
//! assert!(alice_rx
//!     .try_iter()
//!     .any(|event| matches!(event, ServerEvent::MoveMade { .. })));
//! ```

pub mod state;

#[cfg(test)]
pub(crate) mod testing;

// Re-export everything from state module at crate root
pub use state::*;

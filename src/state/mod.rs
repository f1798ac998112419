//! State management module for MatchPlay.
//!
//! This module provides the core state types and managers:
//!
//! - `participant` - Connected participants and their outbound channels
//! - `event` - Inbound/outbound event contract, sides and outcomes
//! - `rules` - The rules engine the sessions drive
//! - `queue` - FIFO waiting queue
//! - `session` - Per-match state machine
//! - `registry` - Live sessions indexed by id and participant
//! - `coordinator` - Ties it together: admit, pair, route, reclaim
//! - `config` - Coordinator tunables
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                          MatchCoordinator                             │
//! │                                                                       │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌───────────────────────┐  │
//! │  │  connections    │  │  WaitingQueue   │  │   SessionRegistry     │  │
//! │  │                 │  │                 │  │                       │  │
//! │  │ participant_id →│  │ [oldest, ...]   │  │ session_id →          │  │
//! │  │   Channel       │  │                 │  │   MatchSession        │  │
//! │  │                 │  │  pop_pair() ────┼──┼─▶                     │  │
//! │  │                 │  │                 │  │ participant_id →      │  │
//! │  │                 │  │                 │  │   session_id          │  │
//! │  └─────────────────┘  └─────────────────┘  └───────────────────────┘  │
//! │                                                                       │
//! │  ┌────────────────────────────────────────────────────────────────┐   │
//! │  │                 MatchSession (per pair)                         │   │
//! │  │                                                                 │   │
//! │  │   AwaitingStart ──▶ InProgress ──▶ Complete { outcome }         │   │
//! │  │         └─────────────────────────────▲                         │   │
//! │  └────────────────────────────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use matchplay_state::state::{ClientEvent, CoordinatorConfig, DisplayData, MatchCoordinator};
//!
//! let mut coordinator = MatchCoordinator::with_config(MyRules::default(), CoordinatorConfig::default());
//!
//! // Transport binding: on connect, on every inbound event, on disconnect
//! coordinator.connect("p1", channel_for_p1);
//! coordinator.handle_event("p1", ClientEvent::Join(DisplayData::new("Alice")));
//! coordinator.on_participant_lost("p1");
//! ```

pub mod config;
pub mod coordinator;
pub mod event;
pub mod participant;
pub mod queue;
pub mod registry;
pub mod rules;
pub mod session;

// Re-export commonly used types
pub use config::CoordinatorConfig;
pub use coordinator::{CoordinatorStatus, MatchCoordinator};
pub use event::{ClientEvent, Outcome, OutcomeReason, ServerEvent, Side};
pub use participant::{
    Channel, ChannelError, ChannelRef, DisplayData, Participant, ParticipantId,
};
pub use queue::{QueueEntry, QueueError, WaitingQueue};
pub use registry::{RegistryError, SessionRegistry};
pub use rules::{MoveRejected, RulesEngine, TerminalStatus};
pub use session::{
    DrawOffer, MatchSession, SessionAction, SessionError, SessionId, SessionPhase,
};

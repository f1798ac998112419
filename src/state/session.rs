//! Match session state machine.
//!
//! One session owns one pair of participants and one rules engine. It relays
//! moves, runs the resign/draw/abandon protocol and completes exactly once.
//!
//! # State Diagram
//!
//! ```text
//! ┌───────────────┐  both ready   ┌─────────────┐
//! │ AwaitingStart │──────────────▶│ InProgress  │◀─┐ move / offer / decline
//! └──────┬────────┘               └──────┬──────┘──┘
//!        │ resign / abandon              │ terminal move / resign /
//!        │                               │ draw accepted / abandon
//!        ▼                               ▼
//!      ┌──────────────────────────────────────┐
//!      │ Complete { outcome }                 │
//!      └──────────────────────────────────────┘
//! ```
//!
//! `AwaitingStart` only exists with the ready check enabled; otherwise a
//! session starts `InProgress`. A `Complete` session holds no participants
//! and no position, only its outcome.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::event::{Outcome, OutcomeReason, ServerEvent, Side};
use super::participant::{Participant, ParticipantId};
use super::rules::{MoveRejected, RulesEngine, TerminalStatus};

/// Unique session token.
pub type SessionId = Uuid;

/// Externally visible phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    AwaitingStart,
    InProgress,
    Complete,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingStart => "awaiting_start",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
        }
    }
}

/// Actions a participant can take inside a match.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    Ready,
    Move(Value),
    Resign,
    OfferDraw,
    AcceptDraw,
    DeclineDraw,
}

impl SessionAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Move(_) => "move",
            Self::Resign => "resign",
            Self::OfferDraw => "offerDraw",
            Self::AcceptDraw => "drawAccepted",
            Self::DeclineDraw => "drawDeclined",
        }
    }
}

/// Draw sub-state while in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawOffer {
    #[default]
    None,
    Offered {
        by: Side,
    },
}

/// Why an action had no effect. None of these are fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("match is already complete")]
    Complete,
    #[error("match has not started")]
    NotStarted,
    #[error("match has already started")]
    AlreadyStarted,
    #[error("not your turn")]
    NotYourTurn,
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("a draw offer is already pending")]
    DrawAlreadyOffered,
    #[error("no draw offer to answer")]
    NoDrawOffer,
}

/// Stage of a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AwaitingStart { ready: [bool; 2] },
    InProgress { draw: DrawOffer },
}

/// Everything a live session owns. Dropped on completion.
#[derive(Debug)]
struct Live<E: RulesEngine> {
    sides: [Participant; 2],
    engine: E,
    position: E::Position,
    to_move: Side,
    stage: Stage,
}

impl<E: RulesEngine> Live<E> {
    fn participant(&self, side: Side) -> &Participant {
        &self.sides[side.index()]
    }

    fn send(&self, side: Side, event: &ServerEvent) {
        self.participant(side).send(event);
    }

    fn broadcast(&self, event: &ServerEvent) {
        for participant in &self.sides {
            participant.send(event);
        }
    }

    fn announce_turn(&self) {
        self.send(self.to_move, &ServerEvent::YourTurn);
        self.send(self.to_move.opponent(), &ServerEvent::OpponentTurn);
    }

    fn position_json(&self) -> Value {
        self.engine.position_to_json(&self.position)
    }

    fn require_in_progress(&mut self) -> Result<&mut DrawOffer, SessionError> {
        match &mut self.stage {
            Stage::InProgress { draw } => Ok(draw),
            Stage::AwaitingStart { .. } => Err(SessionError::NotStarted),
        }
    }
}

#[derive(Debug)]
enum SessionState<E: RulesEngine> {
    Live(Live<E>),
    Complete { outcome: Outcome },
}

/// A two-party match.
#[derive(Debug)]
pub struct MatchSession<E: RulesEngine> {
    pub id: SessionId,
    participant_ids: [ParticipantId; 2],
    state: SessionState<E>,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl<E: RulesEngine> MatchSession<E> {
    /// Create a session and announce the pairing to both sides.
    ///
    /// `side_a` moves first. With `ready_check` the first move is locked until
    /// both sides send `ready`.
    pub fn start(
        id: SessionId,
        side_a: Participant,
        side_b: Participant,
        engine: E,
        ready_check: bool,
    ) -> Self {
        let position = engine.initial_position();
        let stage = if ready_check {
            Stage::AwaitingStart {
                ready: [false, false],
            }
        } else {
            Stage::InProgress {
                draw: DrawOffer::None,
            }
        };
        let live = Live {
            sides: [side_a, side_b],
            engine,
            position,
            to_move: Side::A,
            stage,
        };

        let initial = live.position_json();
        for side in [Side::A, Side::B] {
            live.send(
                side,
                &ServerEvent::MatchFound {
                    session_id: id,
                    side,
                    opponent: live.participant(side.opponent()).display.clone(),
                    position: initial.clone(),
                },
            );
        }
        if !ready_check {
            live.announce_turn();
        }

        Self {
            id,
            participant_ids: [live.sides[0].id.clone(), live.sides[1].id.clone()],
            state: SessionState::Live(live),
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn participant_ids(&self) -> &[ParticipantId; 2] {
        &self.participant_ids
    }

    /// Which side a participant plays, if they are in this session.
    pub fn side_of(&self, participant_id: &str) -> Option<Side> {
        if self.participant_ids[0] == participant_id {
            Some(Side::A)
        } else if self.participant_ids[1] == participant_id {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.state {
            SessionState::Live(live) => match live.stage {
                Stage::AwaitingStart { .. } => SessionPhase::AwaitingStart,
                Stage::InProgress { .. } => SessionPhase::InProgress,
            },
            SessionState::Complete { .. } => SessionPhase::Complete,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, SessionState::Complete { .. })
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match &self.state {
            SessionState::Complete { outcome } => Some(*outcome),
            SessionState::Live(_) => None,
        }
    }

    /// Side to move, while live.
    pub fn to_move(&self) -> Option<Side> {
        match &self.state {
            SessionState::Live(live) => Some(live.to_move),
            SessionState::Complete { .. } => None,
        }
    }

    pub fn draw_offer(&self) -> DrawOffer {
        match &self.state {
            SessionState::Live(Live {
                stage: Stage::InProgress { draw },
                ..
            }) => *draw,
            _ => DrawOffer::None,
        }
    }

    /// Current position, while live.
    pub fn position(&self) -> Option<&E::Position> {
        match &self.state {
            SessionState::Live(live) => Some(&live.position),
            SessionState::Complete { .. } => None,
        }
    }

    /// Handle an action from `side`.
    ///
    /// Returns `Ok(Some(outcome))` when this action completed the match.
    /// Errors mean the action was discarded; nothing was sent to the opponent.
    pub fn handle(
        &mut self,
        side: Side,
        action: SessionAction,
    ) -> Result<Option<Outcome>, SessionError> {
        match action {
            SessionAction::Ready => self.mark_ready(side).map(|()| None),
            SessionAction::Move(descriptor) => self.play_move(side, descriptor),
            SessionAction::Resign => self.resign(side).ok_or(SessionError::Complete).map(Some),
            SessionAction::OfferDraw => self.offer_draw(side).map(|()| None),
            SessionAction::AcceptDraw => self.accept_draw(side).map(Some),
            SessionAction::DeclineDraw => self.decline_draw(side).map(|()| None),
        }
    }

    /// The coordinator lost `side`'s connection. The other side wins.
    pub fn abandon(&mut self, side: Side) -> Option<Outcome> {
        self.finish(Outcome::win(side.opponent(), OutcomeReason::Abandoned))
    }

    /// `side` gives up. Allowed before the first move too.
    pub fn resign(&mut self, side: Side) -> Option<Outcome> {
        self.finish(Outcome::win(side.opponent(), OutcomeReason::Resign))
    }

    fn live_mut(&mut self) -> Result<&mut Live<E>, SessionError> {
        match &mut self.state {
            SessionState::Live(live) => Ok(live),
            SessionState::Complete { .. } => Err(SessionError::Complete),
        }
    }

    fn mark_ready(&mut self, side: Side) -> Result<(), SessionError> {
        let live = self.live_mut()?;
        let Stage::AwaitingStart { ready } = &mut live.stage else {
            return Err(SessionError::AlreadyStarted);
        };
        ready[side.index()] = true;
        if ready.iter().all(|r| *r) {
            live.stage = Stage::InProgress {
                draw: DrawOffer::None,
            };
            live.announce_turn();
        }
        Ok(())
    }

    fn play_move(&mut self, side: Side, descriptor: Value) -> Result<Option<Outcome>, SessionError> {
        let live = self.live_mut()?;
        live.require_in_progress()?;
        if live.to_move != side {
            return Err(SessionError::NotYourTurn);
        }

        let applied = serde_json::from_value::<E::Move>(descriptor.clone())
            .map_err(|err| MoveRejected::new(format!("malformed move: {err}")))
            .and_then(|mv| live.engine.apply(&live.position, side, &mv));
        let position = match applied {
            Ok(position) => position,
            Err(rejected) => {
                live.send(
                    side,
                    &ServerEvent::MoveRejected {
                        reason: rejected.reason.clone(),
                    },
                );
                return Err(SessionError::IllegalMove(rejected.reason));
            }
        };

        live.position = position;
        live.to_move = side.opponent();
        live.broadcast(&ServerEvent::MoveMade {
            descriptor,
            position: live.position_json(),
        });

        match live.engine.terminal_status(&live.position) {
            TerminalStatus::Ongoing => {
                live.announce_turn();
                Ok(None)
            }
            TerminalStatus::Terminal { winner, reason } => {
                Ok(self.finish(Outcome { winner, reason }))
            }
        }
    }

    fn offer_draw(&mut self, side: Side) -> Result<(), SessionError> {
        let live = self.live_mut()?;
        let draw = live.require_in_progress()?;
        if *draw != DrawOffer::None {
            return Err(SessionError::DrawAlreadyOffered);
        }
        *draw = DrawOffer::Offered { by: side };
        live.send(side.opponent(), &ServerEvent::DrawOffered);
        Ok(())
    }

    /// Clear a pending offer made by `side`'s opponent, if there is one.
    fn answer_draw(&mut self, side: Side) -> Result<&mut Live<E>, SessionError> {
        let live = self.live_mut()?;
        let draw = live.require_in_progress()?;
        match *draw {
            DrawOffer::Offered { by } if by == side.opponent() => {
                *draw = DrawOffer::None;
                Ok(live)
            }
            _ => Err(SessionError::NoDrawOffer),
        }
    }

    fn accept_draw(&mut self, side: Side) -> Result<Outcome, SessionError> {
        self.answer_draw(side)?;
        self.finish(Outcome::draw(OutcomeReason::Draw))
            .ok_or(SessionError::Complete)
    }

    fn decline_draw(&mut self, side: Side) -> Result<(), SessionError> {
        let live = self.answer_draw(side)?;
        live.send(side.opponent(), &ServerEvent::DrawDeclined);
        Ok(())
    }

    /// Move to `Complete`. Only the first call has any effect.
    fn finish(&mut self, outcome: Outcome) -> Option<Outcome> {
        if self.is_complete() {
            return None;
        }
        let previous = std::mem::replace(&mut self.state, SessionState::Complete { outcome });
        if let SessionState::Live(live) = previous {
            live.broadcast(&ServerEvent::MatchOver { outcome });
        }
        self.ended_at = Some(Utc::now());
        tracing::info!(
            session = %self.id,
            winner = ?outcome.winner,
            reason = outcome.reason.as_str(),
            "match complete"
        );
        Some(outcome)
    }

    /// Snapshot for status endpoints and logs.
    pub fn to_json(&self) -> Value {
        let (to_move, draw_offered_by) = match &self.state {
            SessionState::Live(live) => {
                let offered = match live.stage {
                    Stage::InProgress {
                        draw: DrawOffer::Offered { by },
                    } => Some(by),
                    _ => None,
                };
                (Some(live.to_move), offered)
            }
            SessionState::Complete { .. } => (None, None),
        };

        serde_json::json!({
            "session_id": self.id,
            "phase": self.phase().as_str(),
            "participants": self.participant_ids,
            "to_move": to_move,
            "draw_offered_by": draw_offered_by,
            "outcome": self.outcome(),
            "created_at": self.created_at,
            "ended_at": self.ended_at
        })
    }
}

impl<E: RulesEngine> fmt::Display for MatchSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} vs {}, {})",
            self.id,
            self.participant_ids[0],
            self.participant_ids[1],
            self.phase().as_str()
        )
    }
}

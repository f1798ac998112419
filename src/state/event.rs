//! Event contract between the core and the transport.
//!
//! Both directions serialize as adjacently tagged JSON:
//! `{"event": "moveMade", "payload": {...}}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::participant::DisplayData;
use super::session::{SessionAction, SessionId};

/// One of the two match positions. `A` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeReason {
    Checkmate,
    Resign,
    Time,
    Draw,
    InsufficientMaterial,
    Abandoned,
}

impl OutcomeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checkmate => "checkmate",
            Self::Resign => "resign",
            Self::Time => "time",
            Self::Draw => "draw",
            Self::InsufficientMaterial => "insufficientMaterial",
            Self::Abandoned => "abandoned",
        }
    }
}

/// Final result of a match. Produced once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: Option<Side>,
    pub reason: OutcomeReason,
}

impl Outcome {
    pub fn win(winner: Side, reason: OutcomeReason) -> Self {
        Self {
            winner: Some(winner),
            reason,
        }
    }

    pub fn draw(reason: OutcomeReason) -> Self {
        Self {
            winner: None,
            reason,
        }
    }
}

/// Inbound events from a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum ClientEvent {
    Join(DisplayData),
    Leave,
    Ready,
    Move(Value),
    Resign,
    OfferDraw,
    DrawAccepted,
    DrawDeclined,
}

impl ClientEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join(_) => "join",
            Self::Leave => "leave",
            Self::Ready => "ready",
            Self::Move(_) => "move",
            Self::Resign => "resign",
            Self::OfferDraw => "offerDraw",
            Self::DrawAccepted => "drawAccepted",
            Self::DrawDeclined => "drawDeclined",
        }
    }

    /// The in-match action this event carries, if any.
    pub fn into_session_action(self) -> Option<SessionAction> {
        match self {
            Self::Join(_) | Self::Leave => None,
            Self::Ready => Some(SessionAction::Ready),
            Self::Move(descriptor) => Some(SessionAction::Move(descriptor)),
            Self::Resign => Some(SessionAction::Resign),
            Self::OfferDraw => Some(SessionAction::OfferDraw),
            Self::DrawAccepted => Some(SessionAction::AcceptDraw),
            Self::DrawDeclined => Some(SessionAction::DeclineDraw),
        }
    }
}

/// Outbound notifications to a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum ServerEvent {
    QueueJoined,
    QueueLeft,
    QueueCount {
        count: usize,
    },
    MatchFound {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
        side: Side,
        opponent: DisplayData,
        position: Value,
    },
    YourTurn,
    OpponentTurn,
    MoveMade {
        descriptor: Value,
        position: Value,
    },
    MoveRejected {
        reason: String,
    },
    DrawOffered,
    DrawDeclined,
    MatchOver {
        outcome: Outcome,
    },
}

impl ServerEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::QueueJoined => "queueJoined",
            Self::QueueLeft => "queueLeft",
            Self::QueueCount { .. } => "queueCount",
            Self::MatchFound { .. } => "matchFound",
            Self::YourTurn => "yourTurn",
            Self::OpponentTurn => "opponentTurn",
            Self::MoveMade { .. } => "moveMade",
            Self::MoveRejected { .. } => "moveRejected",
            Self::DrawOffered => "drawOffered",
            Self::DrawDeclined => "drawDeclined",
            Self::MatchOver { .. } => "matchOver",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::A.opponent(), Side::B);
        assert_eq!(Side::B.opponent(), Side::A);
        assert_eq!(Side::A.to_string(), "a");
    }

    #[test]
    fn test_outcome_json() {
        let outcome = Outcome::win(Side::B, OutcomeReason::Resign);
        assert_eq!(
            serde_json::to_value(outcome).unwrap(),
            json!({"winner": "b", "reason": "resign"})
        );

        let draw = Outcome::draw(OutcomeReason::Draw);
        assert_eq!(
            serde_json::to_value(draw).unwrap(),
            json!({"winner": null, "reason": "draw"})
        );

        assert_eq!(
            serde_json::to_value(OutcomeReason::InsufficientMaterial).unwrap(),
            json!(OutcomeReason::InsufficientMaterial.as_str())
        );
    }

    #[test]
    fn test_client_event_parse() {
        let join: ClientEvent =
            serde_json::from_str(r#"{"event": "join", "payload": {"name": "Alice"}}"#).unwrap();
        assert_eq!(join, ClientEvent::Join(DisplayData::new("Alice")));

        let offer: ClientEvent = serde_json::from_str(r#"{"event": "offerDraw"}"#).unwrap();
        assert_eq!(offer, ClientEvent::OfferDraw);

        let mv: ClientEvent =
            serde_json::from_str(r#"{"event": "move", "payload": {"take": 2}}"#).unwrap();
        assert_eq!(
            mv.into_session_action(),
            Some(SessionAction::Move(json!({"take": 2})))
        );

        assert!(serde_json::from_str::<ClientEvent>(r#"{"event": "teleport"}"#).is_err());
    }

    #[test]
    fn test_session_action_mapping() {
        assert_eq!(ClientEvent::Leave.into_session_action(), None);
        assert_eq!(
            ClientEvent::DrawAccepted.into_session_action(),
            Some(SessionAction::AcceptDraw)
        );
        assert_eq!(
            ClientEvent::DrawDeclined.into_session_action(),
            Some(SessionAction::DeclineDraw)
        );
    }

    #[test]
    fn test_client_event_name_matches_wire_tag() {
        let events = [
            ClientEvent::Join(DisplayData::new("Alice")),
            ClientEvent::Leave,
            ClientEvent::Move(json!({"take": 1})),
            ClientEvent::OfferDraw,
            ClientEvent::DrawAccepted,
        ];
        for event in events {
            let wire = serde_json::to_value(&event).unwrap();
            assert_eq!(wire["event"], json!(event.name()));
        }
    }

    #[test]
    fn test_server_event_json() {
        let event = ServerEvent::MatchOver {
            outcome: Outcome::win(Side::A, OutcomeReason::Abandoned),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "matchOver",
                "payload": {"outcome": {"winner": "a", "reason": "abandoned"}}
            })
        );
        assert_eq!(event.name(), "matchOver");

        assert_eq!(
            serde_json::to_value(ServerEvent::YourTurn).unwrap(),
            json!({"event": "yourTurn"})
        );
        assert_eq!(
            serde_json::to_value(ServerEvent::QueueCount { count: 1 }).unwrap(),
            json!({"event": "queueCount", "payload": {"count": 1}})
        );
    }
}

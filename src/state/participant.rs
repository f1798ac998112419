//! Participant identity and outbound channels.
//!
//! A participant is one connected, anonymous player. The transport owns the
//! actual socket; this crate only sees an outbound [`Channel`] it can push
//! [`ServerEvent`]s into.

use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::event::ServerEvent;

/// Participant ID, stable for the lifetime of one connection.
pub type ParticipantId = String;

/// Shared handle to a participant's outbound channel.
pub type ChannelRef = Arc<dyn Channel>;

/// Errors delivering an event to a participant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The connection is gone or half-closed.
    #[error("channel is closed")]
    Closed,
}

/// Outbound event sink for one connected participant.
///
/// Delivery is at-most-once and in order. Failed sends are never retried by
/// the core; disconnect handling is the only recovery path.
pub trait Channel: fmt::Debug + Send + Sync {
    fn send(&self, event: &ServerEvent) -> Result<(), ChannelError>;
}

impl Channel for mpsc::Sender<ServerEvent> {
    fn send(&self, event: &ServerEvent) -> Result<(), ChannelError> {
        mpsc::Sender::send(self, event.clone()).map_err(|_| ChannelError::Closed)
    }
}

/// Public profile shown to the opponent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplayData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl DisplayData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// A connected participant.
///
/// Held by exactly one owner at a time: the waiting queue, or the session it
/// was paired into. Pairing moves the value; it is never cloned.
#[derive(Debug)]
pub struct Participant {
    pub id: ParticipantId,
    pub display: DisplayData,
    channel: ChannelRef,
}

impl Participant {
    pub fn new(id: impl Into<ParticipantId>, display: DisplayData, channel: ChannelRef) -> Self {
        Self {
            id: id.into(),
            display,
            channel,
        }
    }

    pub fn channel(&self) -> &ChannelRef {
        &self.channel
    }

    /// Deliver an event, logging (not propagating) delivery failures.
    pub fn send(&self, event: &ServerEvent) -> bool {
        deliver(&self.id, &self.channel, event)
    }
}

/// Send on a raw channel handle, logging failures.
pub(crate) fn deliver(id: &str, channel: &ChannelRef, event: &ServerEvent) -> bool {
    match channel.send(event) {
        Ok(()) => {
            tracing::trace!(participant = %id, event = event.name(), "event sent");
            true
        }
        Err(err) => {
            tracing::warn!(participant = %id, %err, event = event.name(), "event not delivered");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingChannel;

    #[test]
    fn test_participant_send() {
        let channel = RecordingChannel::new();
        let participant = Participant::new("p1", DisplayData::new("Alice"), channel.clone());

        assert!(participant.send(&ServerEvent::QueueJoined));
        assert_eq!(channel.events(), vec![ServerEvent::QueueJoined]);
    }

    #[test]
    fn test_send_to_closed_channel() {
        let channel = RecordingChannel::new();
        channel.close();
        let participant = Participant::new("p1", DisplayData::new("Alice"), channel.clone());

        assert!(!participant.send(&ServerEvent::QueueJoined));
        assert!(channel.events().is_empty());
    }

    #[test]
    fn test_mpsc_channel() {
        let (tx, rx) = mpsc::channel();
        let channel: ChannelRef = Arc::new(tx);

        channel.send(&ServerEvent::QueueCount { count: 3 }).unwrap();
        assert_eq!(rx.recv().unwrap(), ServerEvent::QueueCount { count: 3 });

        drop(rx);
        assert_eq!(
            channel.send(&ServerEvent::QueueLeft),
            Err(ChannelError::Closed)
        );
    }

    #[test]
    fn test_display_data_json() {
        let data = DisplayData::new("Alice").with_icon("owl");
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            serde_json::json!({"name": "Alice", "icon": "owl"})
        );

        let parsed: DisplayData = serde_json::from_str(r#"{"name": "Bob"}"#).unwrap();
        assert_eq!(parsed, DisplayData::new("Bob"));
    }
}

//! Waiting queue.
//!
//! Participants wait here, oldest first, until the coordinator pairs them.
//! Insertion order is match priority; an id never appears twice.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use super::participant::{Participant, ParticipantId};

/// Queue errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("participant {0} is already queued")]
    AlreadyQueued(ParticipantId),
}

/// A queued participant.
#[derive(Debug)]
pub struct QueueEntry {
    pub participant: Participant,
    pub queued_at: DateTime<Utc>,
}

/// FIFO of participants waiting for an opponent.
#[derive(Debug, Default)]
pub struct WaitingQueue {
    entries: VecDeque<QueueEntry>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a participant at the back.
    ///
    /// On a duplicate id the participant is handed back unchanged.
    pub fn push(&mut self, participant: Participant) -> Result<(), (QueueError, Participant)> {
        if self.contains(&participant.id) {
            let err = QueueError::AlreadyQueued(participant.id.clone());
            return Err((err, participant));
        }
        self.entries.push_back(QueueEntry {
            participant,
            queued_at: Utc::now(),
        });
        Ok(())
    }

    /// Remove a participant wherever they are in the queue.
    pub fn remove(&mut self, participant_id: &str) -> Option<Participant> {
        let index = self.position(participant_id)?;
        self.entries.remove(index).map(|e| e.participant)
    }

    /// Take the two oldest entries, oldest first.
    pub fn pop_pair(&mut self) -> Option<(Participant, Participant)> {
        if self.entries.len() < 2 {
            return None;
        }
        let first = self.entries.pop_front()?;
        let second = self.entries.pop_front()?;
        Some((first.participant, second.participant))
    }

    pub fn contains(&self, participant_id: &str) -> bool {
        self.position(participant_id).is_some()
    }

    /// Zero-based place in line.
    pub fn position(&self, participant_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.participant.id == participant_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.participant.id.as_str())
    }

    /// How long the front of the queue has been waiting.
    pub fn longest_wait(&self) -> Option<chrono::Duration> {
        self.entries.front().map(|e| Utc::now() - e.queued_at)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DisplayData;
    use crate::testing::RecordingChannel;

    fn make_participant(id: &str) -> Participant {
        Participant::new(id, DisplayData::new(id), RecordingChannel::new())
    }

    #[test]
    fn test_queue_fifo() {
        let mut queue = WaitingQueue::new();
        assert!(queue.pop_pair().is_none());

        queue.push(make_participant("p1")).unwrap();
        assert!(queue.pop_pair().is_none());
        assert_eq!(queue.len(), 1);

        queue.push(make_participant("p2")).unwrap();
        queue.push(make_participant("p3")).unwrap();

        let (first, second) = queue.pop_pair().unwrap();
        assert_eq!(first.id, "p1");
        assert_eq!(second.id, "p2");
        assert_eq!(queue.ids().collect::<Vec<_>>(), vec!["p3"]);
    }

    #[test]
    fn test_queue_rejects_duplicates() {
        let mut queue = WaitingQueue::new();
        queue.push(make_participant("p1")).unwrap();

        let (err, returned) = queue.push(make_participant("p1")).unwrap_err();
        assert_eq!(err, QueueError::AlreadyQueued("p1".to_string()));
        assert_eq!(returned.id, "p1");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_queue_remove() {
        let mut queue = WaitingQueue::new();
        queue.push(make_participant("p1")).unwrap();
        queue.push(make_participant("p2")).unwrap();
        queue.push(make_participant("p3")).unwrap();

        assert_eq!(queue.position("p3"), Some(2));
        assert_eq!(queue.remove("p2").map(|p| p.id), Some("p2".to_string()));
        assert!(queue.remove("p2").is_none());
        assert_eq!(queue.position("p3"), Some(1));
        assert!(!queue.contains("p2"));
    }

    #[test]
    fn test_longest_wait() {
        let mut queue = WaitingQueue::new();
        assert!(queue.longest_wait().is_none());

        queue.push(make_participant("p1")).unwrap();
        assert!(queue.longest_wait().unwrap() >= chrono::Duration::zero());
    }
}

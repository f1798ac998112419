//! Live session registry.
//!
//! Indexed by session id and by participant id. A participant maps to at
//! most one live session.

use std::collections::HashMap;

use super::participant::ParticipantId;
use super::rules::RulesEngine;
use super::session::{MatchSession, SessionId};

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("participant {0} is already in a live session")]
    ParticipantBusy(ParticipantId),
    #[error("session {0} is already registered")]
    DuplicateSession(SessionId),
}

/// Session registry - tracks all live sessions.
#[derive(Debug)]
pub struct SessionRegistry<E: RulesEngine> {
    sessions: HashMap<SessionId, MatchSession<E>>,
    /// Participant ID to session ID
    participant_index: HashMap<ParticipantId, SessionId>,
}

impl<E: RulesEngine> Default for SessionRegistry<E> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
            participant_index: HashMap::new(),
        }
    }
}

impl<E: RulesEngine> SessionRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, indexing both participants.
    pub fn insert(&mut self, session: MatchSession<E>) -> Result<(), RegistryError> {
        if self.sessions.contains_key(&session.id) {
            return Err(RegistryError::DuplicateSession(session.id));
        }
        if let Some(busy) = session
            .participant_ids()
            .iter()
            .find(|id| self.participant_index.contains_key(*id))
        {
            return Err(RegistryError::ParticipantBusy(busy.clone()));
        }

        for participant_id in session.participant_ids() {
            self.participant_index
                .insert(participant_id.clone(), session.id);
        }
        self.sessions.insert(session.id, session);
        Ok(())
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&MatchSession<E>> {
        self.sessions.get(session_id)
    }

    /// Session ID for a participant.
    pub fn session_id_for(&self, participant_id: &str) -> Option<SessionId> {
        self.participant_index.get(participant_id).copied()
    }

    /// Get session for a participant.
    pub fn get_for_participant(&self, participant_id: &str) -> Option<&MatchSession<E>> {
        self.participant_index
            .get(participant_id)
            .and_then(|id| self.sessions.get(id))
    }

    /// Get mutable session for a participant.
    pub fn get_for_participant_mut(
        &mut self,
        participant_id: &str,
    ) -> Option<&mut MatchSession<E>> {
        let id = *self.participant_index.get(participant_id)?;
        self.sessions.get_mut(&id)
    }

    pub fn contains_participant(&self, participant_id: &str) -> bool {
        self.participant_index.contains_key(participant_id)
    }

    /// Remove a session and its index entries. Absent ids are a no-op.
    pub fn remove(&mut self, session_id: &SessionId) -> Option<MatchSession<E>> {
        let session = self.sessions.remove(session_id)?;
        for participant_id in session.participant_ids() {
            self.participant_index.remove(participant_id);
        }
        Some(session)
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

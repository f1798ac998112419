//! Match coordinator.
//!
//! Owns the waiting queue, the live session registry and the connection map.
//! Admits and withdraws participants, pairs them first come first served,
//! routes in-match actions to the owning session, and reclaims sessions once
//! they complete or a participant drops mid-match.
//!
//! Every call runs to completion synchronously. A host serializes calls (one
//! event loop, or a mutex around the coordinator), so there is no locking in
//! here.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::config::CoordinatorConfig;
use super::event::{ClientEvent, ServerEvent};
use super::participant::{deliver, ChannelRef, Participant, ParticipantId};
use super::queue::WaitingQueue;
use super::registry::SessionRegistry;
use super::rules::RulesEngine;
use super::session::{MatchSession, SessionAction, SessionId};

/// Counters for a host's status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinatorStatus {
    pub queued: usize,
    pub live_sessions: usize,
    pub connections: usize,
    pub matches_made: u64,
    /// Seconds the oldest queued participant has waited.
    pub longest_wait_secs: Option<i64>,
}

/// Matchmaking and session routing for one server.
#[derive(Debug)]
pub struct MatchCoordinator<E: RulesEngine> {
    config: CoordinatorConfig,

    /// Prototype engine, cloned into each new session
    engine: E,

    /// Outbound channel per connected participant, for queue broadcasts
    connections: HashMap<ParticipantId, ChannelRef>,

    queue: WaitingQueue,

    sessions: SessionRegistry<E>,

    matches_made: u64,
}

impl<E: RulesEngine> MatchCoordinator<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, CoordinatorConfig::default())
    }

    pub fn with_config(engine: E, config: CoordinatorConfig) -> Self {
        Self {
            config,
            engine,
            connections: HashMap::new(),
            queue: WaitingQueue::new(),
            sessions: SessionRegistry::new(),
            matches_made: 0,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Register a newly connected participant's outbound channel.
    pub fn connect(&mut self, participant_id: impl Into<ParticipantId>, channel: ChannelRef) {
        let participant_id = participant_id.into();
        debug!(participant = %participant_id, "connected");
        self.connections.insert(participant_id, channel);
        self.broadcast_queue_count();
    }

    /// Route one inbound event from a connected participant.
    pub fn handle_event(&mut self, participant_id: &str, event: ClientEvent) {
        let Some(channel) = self.connections.get(participant_id).cloned() else {
            debug!(participant = %participant_id, "event from unknown connection dropped");
            return;
        };
        trace!(participant = %participant_id, event = event.name(), "event received");

        match event {
            ClientEvent::Join(display) => {
                self.admit(Participant::new(participant_id, display, channel));
            }
            ClientEvent::Leave => {
                self.withdraw(participant_id);
            }
            other => {
                if let Some(action) = other.into_session_action() {
                    self.dispatch_action(participant_id, action);
                }
            }
        }
    }

    /// Put a participant in the queue and pair whoever can be paired.
    ///
    /// Returns `false` (and changes nothing) if the id is already queued or
    /// in a live match; callers may retry admission freely.
    pub fn admit(&mut self, participant: Participant) -> bool {
        if self.sessions.contains_participant(&participant.id) {
            debug!(participant = %participant.id, "already in a match, admission ignored");
            return false;
        }

        let participant_id = participant.id.clone();
        let channel = participant.channel().clone();
        if let Err((err, _)) = self.queue.push(participant) {
            debug!(%err, "admission ignored");
            return false;
        }

        deliver(&participant_id, &channel, &ServerEvent::QueueJoined);
        info!(participant = %participant_id, queued = self.queue.len(), "joined queue");

        self.pair_waiting();
        self.broadcast_queue_count();
        true
    }

    /// Take a participant out of the queue. No-op if not queued.
    pub fn withdraw(&mut self, participant_id: &str) -> bool {
        let Some(participant) = self.queue.remove(participant_id) else {
            return false;
        };
        participant.send(&ServerEvent::QueueLeft);
        info!(participant = %participant_id, queued = self.queue.len(), "left queue");
        self.broadcast_queue_count();
        true
    }

    /// Forward an in-match action to the participant's session.
    ///
    /// Actions for participants not in a live match are dropped.
    pub fn dispatch_action(&mut self, participant_id: &str, action: SessionAction) {
        let action_name = action.name();
        let Some(session) = self.sessions.get_for_participant_mut(participant_id) else {
            debug!(participant = %participant_id, action = action_name, "no live session, action dropped");
            return;
        };
        let Some(side) = session.side_of(participant_id) else {
            return;
        };

        match session.handle(side, action) {
            Ok(Some(_)) => {
                let session_id = session.id;
                self.reclaim(&session_id);
            }
            Ok(None) => {}
            Err(err) => {
                debug!(
                    session = %session.id,
                    participant = %participant_id,
                    %side,
                    action = action_name,
                    %err,
                    "action discarded"
                );
            }
        }
    }

    /// The transport reports a participant's connection ended.
    ///
    /// A queued participant is dropped from the queue; a participant in a
    /// match abandons it and the other side wins.
    pub fn on_participant_lost(&mut self, participant_id: &str) {
        self.connections.remove(participant_id);

        if self.queue.remove(participant_id).is_some() {
            info!(participant = %participant_id, "disconnected while queued");
            self.broadcast_queue_count();
            return;
        }

        let Some(session) = self.sessions.get_for_participant_mut(participant_id) else {
            debug!(participant = %participant_id, "disconnected");
            return;
        };
        let Some(side) = session.side_of(participant_id) else {
            return;
        };
        info!(session = %session.id, participant = %participant_id, %side, "disconnected mid-match");
        if session.abandon(side).is_some() {
            let session_id = session.id;
            self.reclaim(&session_id);
        }
    }

    /// Drop a session from the registry. Safe to call repeatedly.
    pub fn reclaim(&mut self, session_id: &SessionId) -> bool {
        match self.sessions.remove(session_id) {
            Some(session) => {
                if !session.is_complete() {
                    warn!(session = %session_id, "reclaimed a session that had not completed");
                }
                info!(session = %session_id, outcome = ?session.outcome(), "session reclaimed");
                true
            }
            None => false,
        }
    }

    /// Pair the queue front-to-back until fewer than two remain.
    fn pair_waiting(&mut self) {
        while let Some((side_a, side_b)) = self.queue.pop_pair() {
            let session_id = Uuid::new_v4();
            info!(session = %session_id, a = %side_a.id, b = %side_b.id, "paired");

            let session = MatchSession::start(
                session_id,
                side_a,
                side_b,
                self.engine.clone(),
                self.config.ready_check,
            );
            // admit() refuses anyone already in a session, so this cannot fail
            let registered = self.sessions.insert(session);
            debug_assert!(registered.is_ok(), "paired participant already in a session");
            match registered {
                Ok(()) => self.matches_made += 1,
                Err(err) => warn!(session = %session_id, %err, "could not register session"),
            }
        }
    }

    fn broadcast_queue_count(&self) {
        if !self.config.broadcast_queue_count {
            return;
        }
        let event = ServerEvent::QueueCount {
            count: self.queue.len(),
        };
        for (participant_id, channel) in &self.connections {
            deliver(participant_id, channel, &event);
        }
    }

    pub fn queue(&self) -> &WaitingQueue {
        &self.queue
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_queued(&self, participant_id: &str) -> bool {
        self.queue.contains(participant_id)
    }

    pub fn is_connected(&self, participant_id: &str) -> bool {
        self.connections.contains_key(participant_id)
    }

    pub fn session(&self, session_id: &SessionId) -> Option<&MatchSession<E>> {
        self.sessions.get(session_id)
    }

    pub fn session_for(&self, participant_id: &str) -> Option<&MatchSession<E>> {
        self.sessions.get_for_participant(participant_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.count()
    }

    pub fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            queued: self.queue.len(),
            live_sessions: self.sessions.count(),
            connections: self.connections.len(),
            matches_made: self.matches_made,
            longest_wait_secs: self.queue.longest_wait().map(|d| d.num_seconds()),
        }
    }
}

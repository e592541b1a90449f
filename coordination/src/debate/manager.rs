//! Owns live debate sessions and is the only thing that mutates them.
//!
//! Each session sits behind its own async mutex, held for the whole of
//! [`DebateManager::advance`] including the oracle call. That serialises
//! turns within a session while unrelated sessions proceed in parallel; the
//! registry lock is only held long enough to look a session up.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use super::dispatcher::{TurnDispatcher, TurnOrigin};
use super::state::{DebateSession, SessionId, Side, Utterance};
use super::tracker::{TopicRotation, TopicTracker, TrackerConfig};
use crate::error::{DebateError, DebateResult};
use crate::topics::TopicPool;

/// Result of one call to [`DebateManager::advance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub session_id: SessionId,
    /// The utterance appended to the log.
    pub utterance: Utterance,
    /// Whether the content was generated or a fallback.
    pub origin: TurnOrigin,
    /// Topic change applied after this turn, if any.
    pub rotation: Option<TopicRotation>,
    /// The session ended with this turn.
    pub terminated: bool,
    /// Turn count after this turn.
    pub turn_count: u32,
}

struct SessionSlot {
    session: DebateSession,
    tracker: TopicTracker,
}

type SessionHandle = Arc<Mutex<SessionSlot>>;

/// Registry of debate sessions sharing one dispatcher.
pub struct DebateManager {
    dispatcher: TurnDispatcher,
    tracker_config: TrackerConfig,
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl DebateManager {
    pub fn new(dispatcher: TurnDispatcher, tracker_config: TrackerConfig) -> DebateResult<Self> {
        dispatcher.config().validate()?;
        tracker_config.validate()?;
        Ok(Self {
            dispatcher,
            tracker_config,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Start a session over `pool`.
    ///
    /// A blank or missing `initial_topic` falls back to the tracker's first topic.
    pub async fn start_session(
        &self,
        pool: TopicPool,
        initial_topic: Option<String>,
    ) -> DebateResult<DebateSession> {
        let tracker = TopicTracker::new(pool, self.tracker_config.clone());
        self.start_session_with_tracker(tracker, initial_topic).await
    }

    /// Start a session with a caller-built tracker (custom random source).
    pub async fn start_session_with_tracker(
        &self,
        tracker: TopicTracker,
        initial_topic: Option<String>,
    ) -> DebateResult<DebateSession> {
        let topic = initial_topic
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| tracker.initialize_topic());

        let session = DebateSession::new(SessionId::generate(), topic);
        info!(
            session_id = %session.id,
            topic = %session.active_topic,
            pool_size = tracker.pool().len(),
            "Debate session started"
        );

        let snapshot = session.clone();
        let slot = SessionSlot { session, tracker };
        self.sessions
            .write()
            .await
            .insert(snapshot.id.clone(), Arc::new(Mutex::new(slot)));
        Ok(snapshot)
    }

    /// Produce the next turn.
    ///
    /// `side` overrides the speaker for this turn only; otherwise sides
    /// alternate on turn parity, starting with [`Side::FIRST`].
    pub async fn advance(&self, id: &SessionId, side: Option<Side>) -> DebateResult<TurnReport> {
        let handle = self.handle(id).await?;
        let mut slot = handle.lock().await;
        let SessionSlot { session, tracker } = &mut *slot;

        if !session.active {
            return Err(DebateError::SessionInactive {
                session_id: session.id.clone(),
                turn_count: session.turn_count,
            });
        }

        let side = side.unwrap_or_else(|| session.next_side());
        let turn = self.dispatcher.dispatch(session, side).await?;

        session.record_turn(turn.utterance.clone());
        let rotation = tracker.apply_rotation(session)?;
        let terminated = tracker.should_terminate(session);
        if terminated {
            session.close();
            info!(
                session_id = %session.id,
                turns = session.turn_count,
                topics_covered = session.topics_covered.len(),
                "Debate session ended"
            );
        }

        Ok(TurnReport {
            session_id: session.id.clone(),
            utterance: turn.utterance,
            origin: turn.origin,
            rotation,
            terminated,
            turn_count: session.turn_count,
        })
    }

    /// Snapshot of a session's current state.
    pub async fn session(&self, id: &SessionId) -> DebateResult<DebateSession> {
        let handle = self.handle(id).await?;
        let slot = handle.lock().await;
        Ok(slot.session.clone())
    }

    /// Discard a session. A turn already in flight finishes on the detached
    /// session and its result is simply not visible here any more.
    pub async fn reset(&self, id: &SessionId) -> DebateResult<()> {
        match self.sessions.write().await.remove(id) {
            Some(_) => {
                info!(session_id = %id, "Debate session reset");
                Ok(())
            }
            None => Err(DebateError::NoSession(id.clone())),
        }
    }

    /// Number of registered sessions, ended ones included.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn session_ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    async fn handle(&self, id: &SessionId) -> DebateResult<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| DebateError::NoSession(id.clone()))
    }
}

//! Sides, utterances, and the session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a debate session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Fresh random identifier.
    pub fn generate() -> Self {
        Self(format!("debate-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One of the two fixed debate participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The side that speaks first when alternation is automatic.
    pub const FIRST: Side = Side::Left;

    /// The other participant.
    pub fn opponent(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Side that speaks on the given 1-indexed turn: odd turns go to
    /// [`Side::FIRST`], even turns to its opponent.
    pub fn for_turn(turn: u32) -> Self {
        if turn % 2 == 1 {
            Self::FIRST
        } else {
            Self::FIRST.opponent()
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// A produced, topic-stamped unit of debate content. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    /// Who spoke.
    pub side: Side,
    /// What was said.
    pub content: String,
    /// Topic that was active when this utterance was produced.
    pub topic: String,
    /// When it was produced.
    pub timestamp: DateTime<Utc>,
}

impl Utterance {
    pub fn new(side: Side, content: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            side,
            content: content.into(),
            topic: topic.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The mutable record of a single debate.
///
/// Fields are readable by anyone holding a snapshot; mutation goes through
/// the crate-private methods used by the manager and tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateSession {
    /// Unique session identifier.
    pub id: SessionId,
    /// Number of produced utterances. Always equals `history.len()` between turns.
    pub turn_count: u32,
    /// Append-only, chronological utterance log.
    pub history: Vec<Utterance>,
    /// Topic applied to the next utterance.
    pub active_topic: String,
    /// Previously active topics, in the order they were retired.
    pub topics_covered: Vec<String>,
    /// False once the debate has terminated.
    pub active: bool,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

impl DebateSession {
    /// Create a live session with an empty log.
    pub fn new(id: SessionId, initial_topic: impl Into<String>) -> Self {
        Self {
            id,
            turn_count: 0,
            history: Vec::new(),
            active_topic: initial_topic.into(),
            topics_covered: Vec::new(),
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Side that speaks next when the caller does not choose one.
    pub fn next_side(&self) -> Side {
        Side::for_turn(self.turn_count + 1)
    }

    /// Most recent utterance by `side`, found by scanning the log backwards.
    pub fn last_utterance_from(&self, side: Side) -> Option<&Utterance> {
        let mut idx = self.history.len();
        while idx > 0 {
            idx -= 1;
            if self.history[idx].side == side {
                return Some(&self.history[idx]);
            }
        }
        None
    }

    /// The last `n` utterances, oldest first.
    pub fn recent(&self, n: usize) -> &[Utterance] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// Append a finished turn. Keeps `turn_count == history.len()`.
    pub(crate) fn record_turn(&mut self, utterance: Utterance) {
        self.history.push(utterance);
        self.turn_count = self.history.len() as u32;
    }

    /// Retire the active topic and make `next` active.
    pub(crate) fn switch_topic(&mut self, next: String) {
        let previous = std::mem::replace(&mut self.active_topic, next);
        self.topics_covered.push(previous);
    }

    /// Enter the terminal state.
    pub(crate) fn close(&mut self) {
        self.active = false;
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] {} turns | topic={} | {} topics covered | {}",
            self.id,
            self.turn_count,
            self.active_topic,
            self.topics_covered.len(),
            if self.active { "active" } else { "ended" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(sides: &[Side]) -> DebateSession {
        let mut session = DebateSession::new(SessionId::from("d-001"), "economy");
        for (i, side) in sides.iter().enumerate() {
            session.record_turn(Utterance::new(*side, format!("msg {}", i + 1), "economy"));
        }
        session
    }

    #[test]
    fn test_new_session() {
        let session = DebateSession::new(SessionId::from("d-001"), "economy");
        assert_eq!(session.turn_count, 0);
        assert!(session.history.is_empty());
        assert!(session.topics_covered.is_empty());
        assert_eq!(session.active_topic, "economy");
        assert!(session.active);
    }

    #[test]
    fn test_side_alternation() {
        assert_eq!(Side::for_turn(1), Side::Left);
        assert_eq!(Side::for_turn(2), Side::Right);
        assert_eq!(Side::for_turn(3), Side::Left);
        assert_eq!(Side::Left.opponent(), Side::Right);
        assert_eq!(Side::Right.opponent(), Side::Left);
    }

    #[test]
    fn test_next_side_follows_turn_count() {
        let session = session_with(&[Side::Left]);
        assert_eq!(session.next_side(), Side::Right);
        let session = session_with(&[Side::Left, Side::Right]);
        assert_eq!(session.next_side(), Side::Left);
    }

    #[test]
    fn test_record_turn_keeps_count_in_sync() {
        let session = session_with(&[Side::Left, Side::Right, Side::Left]);
        assert_eq!(session.turn_count, 3);
        assert_eq!(session.turn_count as usize, session.history.len());
    }

    #[test]
    fn test_last_utterance_from_scans_backwards() {
        let session = session_with(&[Side::Left, Side::Right, Side::Left, Side::Left]);
        assert_eq!(session.last_utterance_from(Side::Left).unwrap().content, "msg 4");
        assert_eq!(session.last_utterance_from(Side::Right).unwrap().content, "msg 2");

        let only_left = session_with(&[Side::Left]);
        assert!(only_left.last_utterance_from(Side::Right).is_none());
    }

    #[test]
    fn test_recent_window() {
        let session = session_with(&[Side::Left, Side::Right, Side::Left, Side::Right, Side::Left]);
        let recent: Vec<_> = session.recent(4).iter().map(|u| u.content.as_str()).collect();
        assert_eq!(recent, vec!["msg 2", "msg 3", "msg 4", "msg 5"]);
        assert_eq!(session_with(&[Side::Left]).recent(4).len(), 1);
    }

    #[test]
    fn test_switch_topic_retires_previous() {
        let mut session = session_with(&[]);
        session.switch_topic("security".to_string());
        assert_eq!(session.active_topic, "security");
        assert_eq!(session.topics_covered, vec!["economy"]);
    }

    #[test]
    fn test_status_line() {
        let mut session = session_with(&[Side::Left, Side::Right]);
        assert!(session.status_line().contains("2 turns"));
        assert!(session.status_line().contains("active"));
        session.close();
        assert!(session.status_line().contains("ended"));
    }

    #[test]
    fn test_side_serde() {
        assert_eq!(serde_json::to_string(&Side::Left).unwrap(), "\"left\"");
        let side: Side = serde_json::from_str("\"right\"").unwrap();
        assert_eq!(side, Side::Right);
        assert_eq!(Side::Right.to_string(), "right");
    }
}

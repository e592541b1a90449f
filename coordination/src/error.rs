//! Error types for debate orchestration.
//!
//! Only [`DebateError`] crosses the orchestration boundary. A
//! [`GenerationError`] is always absorbed by the turn dispatcher and turned
//! into a fallback utterance, so the debate never stalls on the oracle.

use std::time::Duration;

use thiserror::Error;

use crate::debate::state::SessionId;

/// Result type alias for orchestration calls.
pub type DebateResult<T> = Result<T, DebateError>;

/// Errors surfaced to callers of the debate manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DebateError {
    /// No session has been started under this id (or it was reset).
    #[error("no debate session: {0}")]
    NoSession(SessionId),

    /// The session reached its terminal state; no more turns may be appended.
    #[error("debate session {session_id} is no longer active (ended after {turn_count} turns)")]
    SessionInactive {
        session_id: SessionId,
        turn_count: u32,
    },

    /// Configuration rejected before a session could be built.
    #[error("invalid debate configuration: {0}")]
    InvalidConfig(String),
}

impl DebateError {
    /// Whether the caller violated a precondition (as opposed to a setup error).
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::NoSession(_) | Self::SessionInactive { .. })
    }
}

/// Failures of the generation oracle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    RequestFailed(String),

    #[error("generation response parse error: {0}")]
    ParseError(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("generation oracle unavailable: {0}")]
    Unavailable(String),
}

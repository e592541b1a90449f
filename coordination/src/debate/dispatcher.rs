//! Turn dispatcher. Builds the conditioning prompt for one side, calls the
//! generation oracle, and shapes the raw output into a bounded utterance.
//!
//! # Prompt layout
//!
//! ```text
//! <persona priming prefix>
//!
//! Current topic: <active topic>
//!
//! Recent conversation:
//! Me: ...            (last `history_window` utterances,
//! Opponent: ...       relative to the speaking side)
//! Opponent: <opponent's latest utterance, or the opening prompt>
//! Me:
//! ```
//!
//! Oracle failures and timeouts never propagate: the turn falls back to a
//! fixed utterance and the failure is logged.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::state::{DebateSession, Side, Utterance};
use crate::error::{DebateError, DebateResult, GenerationError};
use crate::oracle::{GenerationOracle, SamplingParams};
use crate::persona::PersonaStore;

const SENTENCE_TERMINATORS: [char; 4] = ['.', '?', '!', '。'];

/// Dispatcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Sampling parameters sent with every request.
    pub sampling: SamplingParams,
    /// How many past utterances go into the prompt.
    pub history_window: usize,
    /// Length ceiling (in characters) before an utterance is cut to its first sentence.
    pub max_chars: usize,
    /// Upper bound on a single oracle call.
    pub turn_timeout_secs: u64,
    /// Stands in for the opponent's line when the opponent has not spoken yet.
    pub opening_prompt: String,
    /// Used when the oracle answers with nothing usable.
    pub empty_fallback: String,
    /// Used when the oracle fails or times out.
    pub failure_fallback: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingParams::default(),
            history_window: 4,
            max_chars: 200,
            turn_timeout_secs: 90,
            opening_prompt: "What is your take on this issue?".to_string(),
            empty_fallback: "I need to think about that point a bit more.".to_string(),
            failure_fallback: "Hmm... let me think about that again.".to_string(),
        }
    }
}

impl DispatchConfig {
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }

    pub fn validate(&self) -> DebateResult<()> {
        let invalid = |msg: &str| Err(DebateError::InvalidConfig(msg.to_string()));
        if self.history_window == 0 {
            return invalid("dispatch.history_window must be at least 1");
        }
        if self.max_chars == 0 {
            return invalid("dispatch.max_chars must be at least 1");
        }
        if self.turn_timeout_secs == 0 {
            return invalid("dispatch.turn_timeout_secs must be at least 1");
        }
        if self.sampling.max_new_tokens == 0 {
            return invalid("dispatch.sampling.max_new_tokens must be at least 1");
        }
        if self.sampling.temperature <= 0.0 {
            return invalid("dispatch.sampling.temperature must be positive");
        }
        if !(self.sampling.top_p > 0.0 && self.sampling.top_p <= 1.0) {
            return invalid("dispatch.sampling.top_p must be in (0, 1]");
        }
        if self.empty_fallback.trim().is_empty() || self.failure_fallback.trim().is_empty() {
            return invalid("dispatch fallbacks must not be empty");
        }
        Ok(())
    }
}

/// How a turn's content was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOrigin {
    /// The oracle produced usable text.
    Generated,
    /// The oracle answered but nothing usable was left after post-processing.
    EmptyFallback,
    /// The oracle failed or timed out.
    FailureFallback,
}

impl TurnOrigin {
    pub fn is_fallback(self) -> bool {
        self != Self::Generated
    }
}

impl std::fmt::Display for TurnOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generated => write!(f, "generated"),
            Self::EmptyFallback => write!(f, "empty_fallback"),
            Self::FailureFallback => write!(f, "failure_fallback"),
        }
    }
}

/// A produced turn plus how its content came about.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchedTurn {
    pub utterance: Utterance,
    pub origin: TurnOrigin,
}

/// Produces turns for either side. Cheap to clone; collaborators are shared.
#[derive(Clone)]
pub struct TurnDispatcher {
    persona: Arc<dyn PersonaStore>,
    oracle: Arc<dyn GenerationOracle>,
    config: DispatchConfig,
}

impl TurnDispatcher {
    pub fn new(
        persona: Arc<dyn PersonaStore>,
        oracle: Arc<dyn GenerationOracle>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            persona,
            oracle,
            config,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Produce the next utterance for `side`. Does not touch the session.
    pub async fn produce_turn(
        &self,
        session: &DebateSession,
        side: Side,
    ) -> DebateResult<Utterance> {
        self.dispatch(session, side).await.map(|turn| turn.utterance)
    }

    /// Like [`produce_turn`](Self::produce_turn), also reporting whether a
    /// fallback was used.
    pub async fn dispatch(
        &self,
        session: &DebateSession,
        side: Side,
    ) -> DebateResult<DispatchedTurn> {
        if !session.active {
            return Err(DebateError::SessionInactive {
                session_id: session.id.clone(),
                turn_count: session.turn_count,
            });
        }

        let prompt = self.build_prompt(session, side);
        debug!(
            session_id = %session.id,
            %side,
            turn = session.turn_count + 1,
            prompt_chars = prompt.chars().count(),
            "Prompt assembled"
        );

        let (content, origin) = match self.call_oracle(&prompt).await {
            Ok(raw) => match post_process(&prompt, &raw, self.config.max_chars) {
                Some(text) => (text, TurnOrigin::Generated),
                None => {
                    debug!(session_id = %session.id, %side, "Empty generation, using fallback");
                    (self.config.empty_fallback.clone(), TurnOrigin::EmptyFallback)
                }
            },
            Err(e) => {
                warn!(
                    session_id = %session.id,
                    %side,
                    oracle = %self.oracle.name(),
                    error = %e,
                    "Generation failed, using fallback"
                );
                (self.config.failure_fallback.clone(), TurnOrigin::FailureFallback)
            }
        };

        Ok(DispatchedTurn {
            utterance: Utterance::new(side, content, session.active_topic.clone()),
            origin,
        })
    }

    async fn call_oracle(&self, prompt: &str) -> Result<String, GenerationError> {
        let timeout = self.config.turn_timeout();
        match tokio::time::timeout(timeout, self.oracle.generate(prompt, &self.config.sampling))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(timeout)),
        }
    }

    /// Assemble the conditioning prompt for `side`.
    pub fn build_prompt(&self, session: &DebateSession, side: Side) -> String {
        let mut prompt = self.persona.persona_prompt(side);
        prompt.push_str("\n\nCurrent topic: ");
        prompt.push_str(&session.active_topic);
        prompt.push_str("\n\nRecent conversation:\n");

        for utterance in session.recent(self.config.history_window) {
            let speaker = if utterance.side == side { "Me" } else { "Opponent" };
            prompt.push_str(speaker);
            prompt.push_str(": ");
            prompt.push_str(&utterance.content);
            prompt.push('\n');
        }

        let opponent_line = session
            .last_utterance_from(side.opponent())
            .map(|u| u.content.as_str())
            .unwrap_or(self.config.opening_prompt.as_str());
        prompt.push_str("Opponent: ");
        prompt.push_str(opponent_line);
        prompt.push_str("\nMe:");
        prompt
    }
}

/// Strip an echoed prompt, trim, and bound the length.
///
/// Text longer than `max_chars` is cut after its first sentence terminator;
/// if that segment is still too long (or has no terminator) it is cut at
/// `max_chars` characters. Returns `None` when nothing is left.
pub fn post_process(prompt: &str, raw: &str, max_chars: usize) -> Option<String> {
    let text = raw.strip_prefix(prompt).unwrap_or(raw).trim();
    if text.is_empty() {
        return None;
    }
    if text.chars().count() <= max_chars {
        return Some(text.to_string());
    }

    let first_sentence = match text.find(|c: char| SENTENCE_TERMINATORS.contains(&c)) {
        Some(idx) => {
            let end = idx + text[idx..].chars().next().map_or(0, char::len_utf8);
            &text[..end]
        }
        None => text,
    };
    let bounded: String = first_sentence.chars().take(max_chars).collect();
    let bounded = bounded.trim();
    if bounded.is_empty() {
        None
    } else {
        Some(bounded.to_string())
    }
}

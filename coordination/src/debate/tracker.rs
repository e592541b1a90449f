//! Topic rotation and termination policy.
//!
//! Rotation and termination both compare the turn count against a threshold
//! drawn from a uniform range. The threshold is re-drawn on every check, so
//! debate length and rotation cadence vary between runs unless the tracker's
//! random source is seeded.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::state::DebateSession;
use crate::error::{DebateError, DebateResult};
use crate::topics::TopicPool;

/// Topic used whenever the pool has nothing to offer.
pub const DEFAULT_TOPIC: &str = "general political issue";

/// Inclusive integer range a threshold is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub min: u32,
    pub max: u32,
}

impl ThresholdRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Degenerate range that always yields `value`.
    pub const fn fixed(value: u32) -> Self {
        Self::new(value, value)
    }

    /// Draw a threshold uniformly from `[min, max]`.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    fn validate(&self, name: &str) -> DebateResult<()> {
        if self.min > self.max {
            return Err(DebateError::InvalidConfig(format!(
                "{name}: min {} exceeds max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for ThresholdRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Rotation and termination policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Turns between topic rotations.
    pub rotation_interval: ThresholdRange,
    /// Turn count at which the debate ends.
    pub termination_turns: ThresholdRange,
    /// Seed for the threshold draws. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            rotation_interval: ThresholdRange::new(8, 12),
            termination_turns: ThresholdRange::new(50, 80),
            seed: None,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> DebateResult<()> {
        self.rotation_interval.validate("rotation_interval")?;
        self.termination_turns.validate("termination_turns")?;
        if self.rotation_interval.min == 0 {
            return Err(DebateError::InvalidConfig(
                "rotation_interval: must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A topic change applied to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRotation {
    pub from: String,
    pub to: String,
    /// Turn count at which the rotation happened.
    pub at_turn: u32,
}

/// Owns a session's topic pool and decides when to rotate or stop.
pub struct TopicTracker {
    pool: TopicPool,
    config: TrackerConfig,
    rng: StdRng,
}

impl TopicTracker {
    /// Build a tracker, seeding its random source from `config.seed` when set.
    pub fn new(pool: TopicPool, config: TrackerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(pool, config, rng)
    }

    /// Build a tracker around an explicit random source.
    pub fn with_rng(pool: TopicPool, config: TrackerConfig, rng: StdRng) -> Self {
        Self { pool, config, rng }
    }

    pub fn pool(&self) -> &TopicPool {
        &self.pool
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// First pool topic, or [`DEFAULT_TOPIC`] for an empty pool.
    pub fn initialize_topic(&self) -> String {
        self.pool.first().unwrap_or(DEFAULT_TOPIC).to_string()
    }

    /// True when the turn count lands on a freshly drawn rotation interval.
    pub fn should_rotate(&mut self, session: &DebateSession) -> bool {
        if session.turn_count == 0 {
            return false;
        }
        let interval = self.config.rotation_interval.draw(&mut self.rng).max(1);
        session.turn_count % interval == 0
    }

    /// Pick the next topic.
    ///
    /// Prefers pool topics that are neither covered nor currently active.
    /// Once those run out, any pool topic may come back.
    pub fn next_topic(&mut self, session: &DebateSession) -> String {
        let unused: Vec<&String> = self
            .pool
            .topics()
            .iter()
            .filter(|t| **t != session.active_topic && !session.topics_covered.contains(t))
            .collect();

        if let Some(topic) = unused.choose(&mut self.rng) {
            return (*topic).clone();
        }

        self.pool
            .topics()
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string())
    }

    /// Rotate the session's topic if a rotation is due and yields a new topic.
    pub fn apply_rotation(
        &mut self,
        session: &mut DebateSession,
    ) -> DebateResult<Option<TopicRotation>> {
        if !session.active {
            return Err(DebateError::SessionInactive {
                session_id: session.id.clone(),
                turn_count: session.turn_count,
            });
        }

        if !self.should_rotate(session) {
            return Ok(None);
        }

        let next = self.next_topic(session);
        if next == session.active_topic {
            return Ok(None);
        }

        let rotation = TopicRotation {
            from: session.active_topic.clone(),
            to: next.clone(),
            at_turn: session.turn_count,
        };
        session.switch_topic(next);
        info!(
            session_id = %session.id,
            turn = rotation.at_turn,
            from = %rotation.from,
            to = %rotation.to,
            "Topic rotated"
        );
        Ok(Some(rotation))
    }

    /// True once the turn count reaches a freshly drawn termination threshold.
    pub fn should_terminate(&mut self, session: &DebateSession) -> bool {
        let limit = self.config.termination_turns.draw(&mut self.rng);
        session.turn_count >= limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::state::{SessionId, Side, Utterance};

    fn pool() -> TopicPool {
        TopicPool::new(["경제", "안보", "복지"])
    }

    fn fixed_config(rotation: u32, termination: u32) -> TrackerConfig {
        TrackerConfig {
            rotation_interval: ThresholdRange::fixed(rotation),
            termination_turns: ThresholdRange::fixed(termination),
            seed: Some(7),
        }
    }

    fn session_at(turns: u32, topic: &str) -> DebateSession {
        let mut session = DebateSession::new(SessionId::from("d-001"), topic);
        for turn in 1..=turns {
            session.record_turn(Utterance::new(Side::for_turn(turn), "x", topic));
        }
        session
    }

    #[test]
    fn test_initialize_topic_uses_first_pool_entry() {
        let tracker = TopicTracker::new(pool(), TrackerConfig::default());
        assert_eq!(tracker.initialize_topic(), "경제");
    }

    #[test]
    fn test_initialize_topic_empty_pool_defaults() {
        let tracker = TopicTracker::new(TopicPool::default(), TrackerConfig::default());
        assert_eq!(tracker.initialize_topic(), DEFAULT_TOPIC);
    }

    #[test]
    fn test_should_rotate_never_at_zero() {
        let mut tracker = TopicTracker::new(pool(), fixed_config(1, 50));
        assert!(!tracker.should_rotate(&session_at(0, "경제")));
        assert!(tracker.should_rotate(&session_at(1, "경제")));
    }

    #[test]
    fn test_should_rotate_on_interval_multiples() {
        let mut tracker = TopicTracker::new(pool(), fixed_config(8, 50));
        assert!(!tracker.should_rotate(&session_at(7, "경제")));
        assert!(tracker.should_rotate(&session_at(8, "경제")));
        assert!(!tracker.should_rotate(&session_at(12, "경제")));
        assert!(tracker.should_rotate(&session_at(16, "경제")));
    }

    #[test]
    fn test_rotation_interval_drawn_within_range() {
        let config = TrackerConfig {
            seed: Some(42),
            ..TrackerConfig::default()
        };
        let mut tracker = TopicTracker::new(pool(), config);
        // 120 is a multiple of every interval in [8, 12] except 9 and 11.
        let session = session_at(120, "경제");
        let hits = (0..200).filter(|_| tracker.should_rotate(&session)).count();
        assert!(hits > 0 && hits < 200);

        // 8*9*10*11*12 divides 95040, so every draw rotates.
        let mut session = session_at(0, "경제");
        session.turn_count = 95_040;
        assert!((0..50).all(|_| tracker.should_rotate(&session)));
    }

    #[test]
    fn test_next_topic_prefers_unused() {
        let mut tracker = TopicTracker::new(pool(), fixed_config(8, 50));
        let mut session = session_at(0, "경제");
        session.switch_topic("안보".to_string());
        for _ in 0..20 {
            assert_eq!(tracker.next_topic(&session), "복지");
        }
    }

    #[test]
    fn test_next_topic_reuses_pool_when_exhausted() {
        let mut tracker = TopicTracker::new(pool(), fixed_config(8, 50));
        let mut session = session_at(0, "경제");
        session.switch_topic("안보".to_string());
        session.switch_topic("복지".to_string());
        for _ in 0..20 {
            let topic = tracker.next_topic(&session);
            assert!(tracker.pool().contains(&topic));
        }
    }

    #[test]
    fn test_next_topic_empty_pool_defaults() {
        let mut tracker = TopicTracker::new(TopicPool::default(), fixed_config(8, 50));
        assert_eq!(tracker.next_topic(&session_at(0, DEFAULT_TOPIC)), DEFAULT_TOPIC);
    }

    #[test]
    fn test_apply_rotation_switches_topic() {
        let mut tracker = TopicTracker::new(pool(), fixed_config(8, 50));
        let mut session = session_at(8, "경제");

        let rotation = tracker.apply_rotation(&mut session).unwrap().unwrap();
        assert_eq!(rotation.from, "경제");
        assert_eq!(rotation.at_turn, 8);
        assert_eq!(session.topics_covered, vec!["경제"]);
        assert!(session.active_topic == "안보" || session.active_topic == "복지");
        assert_eq!(session.active_topic, rotation.to);
    }

    #[test]
    fn test_apply_rotation_noop_off_interval() {
        let mut tracker = TopicTracker::new(pool(), fixed_config(8, 50));
        let mut session = session_at(5, "경제");
        assert!(tracker.apply_rotation(&mut session).unwrap().is_none());
        assert_eq!(session.active_topic, "경제");
        assert!(session.topics_covered.is_empty());
    }

    #[test]
    fn test_apply_rotation_empty_pool_keeps_default() {
        let mut tracker = TopicTracker::new(TopicPool::default(), fixed_config(1, 50));
        let mut session = session_at(0, DEFAULT_TOPIC);
        for turn in 1..=30 {
            session.record_turn(Utterance::new(Side::for_turn(turn), "x", DEFAULT_TOPIC));
            assert!(tracker.apply_rotation(&mut session).unwrap().is_none());
            assert_eq!(session.active_topic, DEFAULT_TOPIC);
        }
        assert!(session.topics_covered.is_empty());
    }

    #[test]
    fn test_apply_rotation_rejects_inactive_session() {
        let mut tracker = TopicTracker::new(pool(), fixed_config(8, 50));
        let mut session = session_at(8, "경제");
        session.close();
        let err = tracker.apply_rotation(&mut session).unwrap_err();
        assert!(err.is_precondition_violation());
        assert_eq!(session.active_topic, "경제");
    }

    #[test]
    fn test_should_terminate_threshold() {
        let mut tracker = TopicTracker::new(pool(), fixed_config(8, 50));
        assert!(!tracker.should_terminate(&session_at(49, "경제")));
        assert!(tracker.should_terminate(&session_at(50, "경제")));
        assert!(tracker.should_terminate(&session_at(51, "경제")));
    }

    #[test]
    fn test_should_terminate_default_range() {
        let config = TrackerConfig {
            seed: Some(3),
            ..TrackerConfig::default()
        };
        let mut tracker = TopicTracker::new(pool(), config);
        assert!(!tracker.should_terminate(&session_at(49, "경제")));
        assert!(tracker.should_terminate(&session_at(80, "경제")));
    }

    #[test]
    fn test_seeded_trackers_agree() {
        let config = TrackerConfig {
            seed: Some(99),
            ..TrackerConfig::default()
        };
        let mut a = TopicTracker::new(pool(), config.clone());
        let mut b = TopicTracker::new(pool(), config);
        let session = session_at(60, "경제");
        let draws_a: Vec<bool> = (0..32).map(|_| a.should_terminate(&session)).collect();
        let draws_b: Vec<bool> = (0..32).map(|_| b.should_terminate(&session)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_config_validation() {
        assert!(TrackerConfig::default().validate().is_ok());

        let inverted = TrackerConfig {
            termination_turns: ThresholdRange::new(80, 50),
            ..TrackerConfig::default()
        };
        assert!(inverted.validate().is_err());

        let zero = TrackerConfig {
            rotation_interval: ThresholdRange::new(0, 4),
            ..TrackerConfig::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_threshold_range_display() {
        assert_eq!(ThresholdRange::new(8, 12).to_string(), "[8, 12]");
    }
}

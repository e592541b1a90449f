//! Two-sided scripted debate
//!
//! Turn-taking state machine for a LEFT/RIGHT debate. Each turn is
//! conditioned on the speaker's persona, the active topic, and recent
//! history; topics rotate on a randomized cadence and the debate ends after
//! a randomized number of turns.
//!
//! # Turn Flow
//!
//! ```text
//! advance(session, side?)
//!   │
//!   ├─ session missing/ended → PreconditionViolation
//!   │
//!   ├─ side = override or parity(turn_count + 1)
//!   ├─ TurnDispatcher: persona + topic + last 4 + opponent's last line
//!   │     └─ oracle fails / times out / returns nothing → fallback utterance
//!   ├─ append utterance (stamped with the active topic)
//!   ├─ TopicTracker: rotate topic? (turn_count % draw[8,12] == 0)
//!   └─ TopicTracker: terminate? (turn_count >= draw[50,80]) → active = false
//! ```

pub mod dispatcher;
pub mod manager;
pub mod state;
pub mod tracker;

pub use dispatcher::{post_process, DispatchConfig, DispatchedTurn, TurnDispatcher, TurnOrigin};
pub use manager::{DebateManager, TurnReport};
pub use state::{DebateSession, SessionId, Side, Utterance};
pub use tracker::{ThresholdRange, TopicRotation, TopicTracker, TrackerConfig, DEFAULT_TOPIC};

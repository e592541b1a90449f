//! Debate Coordination Library
//!
//! Orchestration core for a two-sided scripted debate: two opposing sides
//! (LEFT/RIGHT) take turns producing comments, each conditioned on a persona
//! profile, the active topic, and the recent exchange.
//!
//! # Components
//!
//! - [`debate::TurnDispatcher`]: assembles the prompt for one side, calls the
//!   generation oracle, and bounds the output (with fallbacks on failure)
//! - [`debate::TopicTracker`]: topic rotation and termination policy
//! - [`debate::DebateManager`]: owns sessions; the only thing that mutates them
//! - [`oracle::GenerationOracle`]: text generation backend (HTTP implementation
//!   in [`oracle::HttpOracle`])
//! - [`persona::PersonaStore`]: per-side priming prefixes
//!
//! # Usage
//!
//! ```rust,ignore
//! let dispatcher = TurnDispatcher::new(personas, oracle, config.dispatch.clone());
//! let manager = DebateManager::new(dispatcher, config.tracker.clone())?;
//!
//! let session = manager.start_session(TopicPool::from_analysis(&analysis), None).await?;
//! loop {
//!     let report = manager.advance(&session.id, None).await?;
//!     println!("{}: {}", report.utterance.side, report.utterance.content);
//!     if report.terminated {
//!         break;
//!     }
//! }
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod debate;
pub mod error;
pub mod oracle;
pub mod persona;
pub mod topics;

pub use config::DebateConfig;
pub use debate::{
    DebateManager, DebateSession, DispatchConfig, SessionId, Side, ThresholdRange, TopicRotation,
    TopicTracker, TrackerConfig, TurnDispatcher, TurnOrigin, TurnReport, Utterance, DEFAULT_TOPIC,
};
pub use error::{DebateError, DebateResult, GenerationError};
pub use oracle::{GenerationOracle, HttpOracle, HttpOracleConfig, SamplingParams};
pub use persona::{PersonaProfile, PersonaStore, ProfilePersonaStore};
pub use topics::{AnalysisSummary, Argument, TopicPool};

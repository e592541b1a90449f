//! Debate configuration: a TOML file plus environment overrides.
//!
//! ```toml
//! [oracle]
//! url = "http://localhost:8080/v1"
//! model = "kogpt2-base-v2"
//!
//! [dispatch]
//! history_window = 4
//! max_chars = 200
//!
//! [dispatch.sampling]
//! max_new_tokens = 150
//! temperature = 0.8
//! top_p = 0.9
//!
//! [tracker]
//! rotation_interval = { min = 8, max = 12 }
//! termination_turns = { min = 50, max = 80 }
//! seed = 42
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::debate::dispatcher::DispatchConfig;
use crate::debate::tracker::TrackerConfig;
use crate::error::DebateResult;
use crate::oracle::HttpOracleConfig;

pub const ENV_ORACLE_URL: &str = "DEBATE_ORACLE_URL";
pub const ENV_ORACLE_MODEL: &str = "DEBATE_ORACLE_MODEL";
pub const ENV_ORACLE_API_KEY: &str = "DEBATE_ORACLE_API_KEY";
pub const ENV_SEED: &str = "DEBATE_SEED";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    pub oracle: HttpOracleConfig,
    pub dispatch: DispatchConfig,
    pub tracker: TrackerConfig,
}

impl DebateConfig {
    /// Load from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse debate config {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `DEBATE_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var(ENV_ORACLE_URL) {
            self.oracle.url = url;
        }
        if let Some(model) = var(ENV_ORACLE_MODEL) {
            self.oracle.model = model;
        }
        if let Some(key) = var(ENV_ORACLE_API_KEY).filter(|k| !k.is_empty()) {
            self.oracle.api_key = Some(key);
        }
        if let Some(seed) = var(ENV_SEED) {
            let seed = seed.trim().parse::<u64>().with_context(|| {
                format!("{} must be an unsigned integer, got {:?}", ENV_SEED, seed)
            })?;
            self.tracker.seed = Some(seed);
        }
        Ok(())
    }

    pub fn validate(&self) -> DebateResult<()> {
        self.dispatch.validate()?;
        self.tracker.validate()
    }
}

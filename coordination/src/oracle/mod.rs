//! The opaque text-generation capability behind each turn.
//!
//! Implementations must be safe to share between sessions; the dispatcher
//! holds them as `Arc<dyn GenerationOracle>` and calls them concurrently.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

pub use http::{HttpOracle, HttpOracleConfig};

/// Sampling parameters passed with every generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParams {
    /// Upper bound on generated tokens.
    pub max_new_tokens: u32,
    pub temperature: f32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_new_tokens: 150,
            temperature: 0.8,
            top_p: 0.9,
        }
    }
}

/// Text generation backend.
#[async_trait]
pub trait GenerationOracle: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Generate a continuation of `prompt`.
    ///
    /// The returned text may or may not echo the prompt; the dispatcher strips
    /// an echoed prefix either way.
    async fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_defaults() {
        let params = SamplingParams::default();
        assert_eq!(params.max_new_tokens, 150);
        assert!((params.temperature - 0.8).abs() < f32::EPSILON);
        assert!((params.top_p - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sampling_partial_deserialize() {
        let params: SamplingParams = serde_json::from_str(r#"{"temperature": 1.1}"#).unwrap();
        assert_eq!(params.max_new_tokens, 150);
        assert!((params.temperature - 1.1).abs() < f32::EPSILON);
    }
}

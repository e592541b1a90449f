//! Per-side persona profiles and the priming prefix built from them.
//!
//! Profiles are produced upstream from collected comments; this module only
//! holds them and renders the natural-language prefix that conditions a turn.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::debate::state::Side;

const PROMPT_KEYWORDS: usize = 5;
const PROMPT_QUOTES: usize = 3;

/// Read-only source of priming prefixes. Shared across sessions.
pub trait PersonaStore: Send + Sync {
    /// Priming prefix for `side`.
    fn persona_prompt(&self, side: Side) -> String;
}

/// Structured persona for one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaProfile {
    /// One-sentence summary.
    pub summary: String,
    /// Core values.
    pub values: Vec<String>,
    /// Tone traits.
    pub tone: Vec<String>,
    /// Dominant emotional style.
    pub emotion: String,
    /// Frequently used keywords.
    pub keywords: Vec<String>,
    /// Representative comments.
    pub quote_examples: Vec<String>,
}

/// Profiles for both sides, as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilePersonaStore {
    pub left: Option<PersonaProfile>,
    pub right: Option<PersonaProfile>,
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Left => "progressive (left-leaning)",
        Side::Right => "conservative (right-leaning)",
    }
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

impl ProfilePersonaStore {
    pub fn new(left: PersonaProfile, right: PersonaProfile) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
        }
    }

    /// Load `{"left": {...}, "right": {...}}` from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read personas from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse personas from {}", path.display()))
    }

    pub fn profile(&self, side: Side) -> Option<&PersonaProfile> {
        match side {
            Side::Left => self.left.as_ref(),
            Side::Right => self.right.as_ref(),
        }
    }

    /// Both sides have a profile.
    pub fn is_ready(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }
}

impl PersonaStore for ProfilePersonaStore {
    fn persona_prompt(&self, side: Side) -> String {
        let label = side_label(side);
        let Some(profile) = self.profile(side) else {
            return format!("You are a Korean online commenter with a {} outlook.", label);
        };

        let keywords: Vec<&str> = profile
            .keywords
            .iter()
            .take(PROMPT_KEYWORDS)
            .map(String::as_str)
            .collect();
        let quotes: Vec<String> = profile
            .quote_examples
            .iter()
            .take(PROMPT_QUOTES)
            .map(|q| format!("- {}", q))
            .collect();

        format!(
            "You are a Korean YouTube commenter with a {label} outlook.\n\n\
             Persona:\n\
             - Summary: {summary}\n\
             - Core values: {values}\n\
             - Tone: {tone}\n\
             - Emotion: {emotion}\n\
             - Frequent keywords: {keywords}\n\n\
             Example comments:\n{quotes}\n\n\
             Write a natural, realistic comment that follows the patterns and voice above.",
            label = label,
            summary = or_na(&profile.summary),
            values = profile.values.join(", "),
            tone = profile.tone.join(", "),
            emotion = or_na(&profile.emotion),
            keywords = keywords.join(", "),
            quotes = quotes.join("\n"),
        )
    }
}

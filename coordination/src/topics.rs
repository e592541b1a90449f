//! Topic pool derivation from the comment-analysis step.
//!
//! The analysis itself runs elsewhere; this module only turns its summary
//! into the deduplicated candidate set a session rotates through.

use serde::{Deserialize, Serialize};

/// Arguments taken from each side when building a pool.
const ARGUMENTS_PER_SIDE: usize = 3;
/// Controversial keywords taken when building a pool.
const CONTROVERSIAL_KEYWORDS: usize = 5;

/// A single argument extracted for one side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// The point being made.
    pub point: String,
    /// Keywords tied to the point, most relevant first.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Output of the external analysis step, reduced to what topic selection needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSummary {
    pub left_arguments: Vec<Argument>,
    pub right_arguments: Vec<Argument>,
    pub controversial_keywords: Vec<String>,
}

/// Deduplicated candidate topics for one session. Immutable once built.
///
/// First-seen order is kept so "the first topic" is stable for a given input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicPool {
    topics: Vec<String>,
}

impl TopicPool {
    /// Build a pool from raw labels. Labels are trimmed; blanks and repeats are dropped.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut topics: Vec<String> = Vec::new();
        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() || topics.iter().any(|t| t == label) {
                continue;
            }
            topics.push(label.to_string());
        }
        Self { topics }
    }

    /// Lead keyword of the first few arguments on each side, plus the top
    /// controversial keywords.
    pub fn from_analysis(analysis: &AnalysisSummary) -> Self {
        let lead_keywords = |args: &[Argument]| -> Vec<String> {
            args.iter()
                .take(ARGUMENTS_PER_SIDE)
                .filter_map(|arg| arg.keywords.first().cloned())
                .collect()
        };

        let labels = lead_keywords(&analysis.left_arguments)
            .into_iter()
            .chain(lead_keywords(&analysis.right_arguments))
            .chain(
                analysis
                    .controversial_keywords
                    .iter()
                    .take(CONTROVERSIAL_KEYWORDS)
                    .cloned(),
            );
        Self::new(labels)
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn first(&self) -> Option<&str> {
        self.topics.first().map(String::as_str)
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t == topic)
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }
}

use std::path::PathBuf;

use clap::Parser;
use debate_coordination::Side;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Simulate a two-sided debate between comment personas",
    long_about = None
)]
pub struct Args {
    /// JSON file with `left` and `right` persona profiles
    #[arg(long)]
    pub personas: PathBuf,

    /// JSON analysis summary to derive the topic pool from
    #[arg(long)]
    pub analysis: Option<PathBuf>,

    /// Extra topic for the pool (repeatable)
    #[arg(long = "topic")]
    pub topics: Vec<String>,

    /// Topic to open with instead of the first pool topic
    #[arg(long)]
    pub initial_topic: Option<String>,

    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for topic rotation and termination draws (overrides DEBATE_SEED)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many turns even if the debate is still running
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Side that speaks first
    #[arg(long, value_parser = parse_side)]
    pub first: Option<Side>,

    /// Write the final session as JSON to this path
    #[arg(long)]
    pub transcript: Option<PathBuf>,
}

fn parse_side(value: &str) -> Result<Side, String> {
    match value.to_ascii_lowercase().as_str() {
        "left" | "l" => Ok(Side::Left),
        "right" | "r" => Ok(Side::Right),
        other => Err(format!("unknown side {:?} (expected left or right)", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let args = Args::try_parse_from(["debate-sim", "--personas", "p.json"]).unwrap();
        assert_eq!(args.personas, PathBuf::from("p.json"));
        assert!(args.topics.is_empty());
        assert!(args.max_turns.is_none());
        assert!(args.first.is_none());
    }

    #[test]
    fn test_parse_repeated_topics_and_side() {
        let args = Args::try_parse_from([
            "debate-sim",
            "--personas",
            "p.json",
            "--topic",
            "경제",
            "--topic",
            "안보",
            "--first",
            "RIGHT",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(args.topics, vec!["경제", "안보"]);
        assert_eq!(args.first, Some(Side::Right));
        assert_eq!(args.seed, Some(9));
    }

    #[test]
    fn test_parse_rejects_unknown_side() {
        assert!(
            Args::try_parse_from(["debate-sim", "--personas", "p.json", "--first", "centre"])
                .is_err()
        );
    }
}

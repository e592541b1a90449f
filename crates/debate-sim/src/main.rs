//! Debate simulator
//!
//! Drives a LEFT/RIGHT debate between two comment personas against an
//! OpenAI-compatible completions endpoint and prints each turn.
//!
//! # Usage
//!
//! ```bash
//! # Topics from an analysis summary, stop when the debate ends on its own
//! debate-sim --personas personas.json --analysis analysis.json
//!
//! # Explicit topics, fixed seed, 20 turns, save the transcript
//! DEBATE_ORACLE_URL=http://localhost:8080/v1 \
//!     debate-sim --personas personas.json --topic 경제 --topic 안보 \
//!     --seed 42 --max-turns 20 --transcript debate.json
//! ```

mod cli;
mod run;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    run::run(args).await
}

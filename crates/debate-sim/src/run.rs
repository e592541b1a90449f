//! Wiring and the turn loop.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use debate_coordination::{
    AnalysisSummary, DebateConfig, DebateManager, DebateSession, HttpOracle, ProfilePersonaStore,
    SessionId, Side, TopicPool, TurnDispatcher, TurnReport,
};
use tracing::info;

use crate::cli::Args;

pub async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;

    let personas = ProfilePersonaStore::load(&args.personas)?;
    if !personas.is_ready() {
        bail!(
            "persona file {} must define both left and right profiles",
            args.personas.display()
        );
    }

    let pool = build_pool(args.analysis.as_deref(), &args.topics)?;
    let oracle = HttpOracle::new(config.oracle.clone()).context("Failed to build oracle client")?;
    info!(
        oracle = %config.oracle.url,
        model = %config.oracle.model,
        topics = pool.len(),
        "Debate simulator starting"
    );

    let dispatcher = TurnDispatcher::new(
        Arc::new(personas),
        Arc::new(oracle),
        config.dispatch.clone(),
    );
    let manager = DebateManager::new(dispatcher, config.tracker.clone())?;
    let session = manager.start_session(pool, args.initial_topic.clone()).await?;

    let finished = drive(
        &manager,
        &session.id,
        args.first,
        args.max_turns,
        &mut std::io::stdout(),
    )
    .await?;

    info!(status = %finished.status_line(), "Debate finished");

    if let Some(path) = args.transcript.as_deref() {
        write_transcript(path, &finished)?;
        info!(path = %path.display(), "Transcript written");
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<DebateConfig> {
    let mut config = match args.config.as_deref() {
        Some(path) => DebateConfig::load(path)?,
        None => DebateConfig::default(),
    };
    config.apply_env()?;
    if let Some(seed) = args.seed {
        config.tracker.seed = Some(seed);
    }
    config.validate()?;
    Ok(config)
}

/// Pool from the analysis file (if any) followed by explicit topics.
fn build_pool(analysis: Option<&Path>, topics: &[String]) -> Result<TopicPool> {
    let mut labels: Vec<String> = Vec::new();
    if let Some(path) = analysis {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let summary: AnalysisSummary = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse analysis {}", path.display()))?;
        labels.extend(TopicPool::from_analysis(&summary).topics().iter().cloned());
    }
    labels.extend(topics.iter().cloned());
    Ok(TopicPool::new(labels))
}

/// Advance until the session ends or `max_turns` turns were produced,
/// printing each turn to `out`.
pub async fn drive<W: Write>(
    manager: &DebateManager,
    id: &SessionId,
    first: Option<Side>,
    max_turns: Option<u32>,
    out: &mut W,
) -> Result<DebateSession> {
    loop {
        let session = manager.session(id).await?;
        if !session.active || max_turns.is_some_and(|max| session.turn_count >= max) {
            return Ok(session);
        }

        let side = first.map(|first| {
            if (session.turn_count + 1) % 2 == 1 {
                first
            } else {
                first.opponent()
            }
        });
        let report = manager.advance(id, side).await?;
        print_turn(out, &report)?;
    }
}

fn print_turn<W: Write>(out: &mut W, report: &TurnReport) -> Result<()> {
    let marker = if report.origin.is_fallback() { " *" } else { "" };
    writeln!(
        out,
        "[{:>3}] {:<5} ({}) {}{}",
        report.turn_count,
        report.utterance.side,
        report.utterance.topic,
        report.utterance.content,
        marker
    )?;
    if let Some(rotation) = &report.rotation {
        writeln!(out, "      -- topic: {} -> {}", rotation.from, rotation.to)?;
    }
    if report.terminated {
        writeln!(out, "      -- debate ended after {} turns", report.turn_count)?;
    }
    Ok(())
}

fn write_transcript(path: &Path, session: &DebateSession) -> Result<()> {
    let json = serde_json::to_string_pretty(session)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

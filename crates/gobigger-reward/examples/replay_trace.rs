//! Example: Replay a recorded trajectory through the reward engine
//!
//! Reads JSON lines of the form `{"step": 0, "state": {...}, "action": [x, y, type]}`
//! and prints the per-step reward breakdown followed by the episode stats.
//!
//! ```text
//! cargo run --example replay_trace -- trace.jsonl optimized
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::Context;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use gobigger_reward::prelude::*;

#[derive(Debug, Deserialize)]
struct Record {
    step: u64,
    #[serde(default)]
    state: Option<AgentState>,
    #[serde(default)]
    action: Vec<f64>,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().context("usage: replay_trace <trace.jsonl> [preset]")?;
    let preset: Preset = args.next().as_deref().unwrap_or("optimized").parse()?;

    let mut engine = RewardEngine::from_preset(preset)?;
    let reader = BufReader::new(File::open(&path).with_context(|| format!("opening {path}"))?);

    let mut prev: Option<AgentState> = None;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: Record = serde_json::from_str(&line)
            .with_context(|| format!("{path}:{}: malformed record", line_no + 1))?;

        let outcome = engine.step(prev.as_ref(), record.state.as_ref(), &record.action, record.step);
        println!(
            "step {:>5}  reward {:>9.4}  {}",
            record.step,
            outcome.reward.value(),
            serde_json::to_string(&outcome.components)?
        );
        prev = record.state;
    }

    let stats = engine.episode_stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);
    println!("split efficiency: {:.2}", stats.split_efficiency_ratio());
    engine.reset();

    Ok(())
}

//! Replays a recorded pose stream through the analyzer.
//!
//! See `squat_coach::replay` for the input format.

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use clap::Parser;
use squat_coach::config::{Config, DEFAULT_CONFIG_PATH};
use squat_coach::replay::replay;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "replay")]
#[command(about = "Run a recorded pose stream through the squat analyzer")]
struct Args {
    /// JSON-lines recording
    input: String,

    /// Path to config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = Config::load_or_default(&args.config)?;
    let file = File::open(&args.input).with_context(|| format!("failed to open {}", args.input))?;

    let summary = replay(BufReader::new(file), config.rules, |r| {
        let tags: Vec<&str> = r.feedback.iter().map(|t| t.as_str()).collect();
        println!("rep {:>3} (line {}): {}", r.number, r.line, tags.join(", "));
    })?;

    println!();
    println!("frames: {} (skipped {})", summary.frames, summary.skipped);
    println!("{}", serde_json::to_string_pretty(&summary.report)?);
    Ok(())
}

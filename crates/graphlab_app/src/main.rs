// SPDX-License-Identifier: MIT OR Apache-2.0
//! `GraphLab` - interactive multigraph construction and analysis
//!
//! Headless frontend for the graph core:
//! - Scene table mirroring colors and highlights per element
//! - Control panel rendered with egui
//! - Event console logging bus traffic
//! - Script runner replaying input events and panel commands
//!
//! ## Usage
//!
//! `graphlab [--settings FILE] [--save-settings FILE] [SCRIPT.ron]`
//!
//! Without a script the built-in demo runs. The outcome is printed to
//! stdout as JSON; logs go to stderr.

mod console;
mod panel;
mod scene;
mod script;

use clap::Parser;
use graphlab_graph::GraphSettings;
use script::{Script, ScriptError, ScriptRunner};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(name = "graphlab", version)]
#[command(about = "Replay a multigraph script and print the outcome as JSON")]
struct Args {
    /// RON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings to this RON file
    #[arg(long)]
    save_settings: Option<PathBuf>,

    /// RON script to replay (the built-in demo when omitted)
    script: Option<PathBuf>,
}

fn run(args: Args) -> Result<(), ScriptError> {
    let settings = match &args.settings {
        Some(path) => GraphSettings::load(path)?,
        None => GraphSettings::default(),
    };
    if let Some(path) = &args.save_settings {
        settings.save(path)?;
        tracing::info!(path = %path.display(), "settings written");
    }

    let script = match &args.script {
        Some(path) => Script::load(path)?,
        None => Script::demo(),
    };
    tracing::info!(steps = script.steps.len(), "running script");

    let outcome = ScriptRunner::new(settings).run(script);
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn main() {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("graphlab=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting GraphLab v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args) {
        tracing::error!("GraphLab failed: {e}");
        std::process::exit(1);
    }
}

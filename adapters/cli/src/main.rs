#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs The Last Protocol in a terminal.

mod config;
mod dispatch;
mod session;

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{SessionConfig, Settings},
    session::{Outcome, Session},
};

#[derive(Parser, Debug)]
#[command(
    name = "last-protocol",
    author,
    version,
    about = "Turn-based hacking mission through a corrupted Kathmandu",
    long_about = None
)]
struct Cli {
    /// TOML session file with seed, player name, inventory and ambient odds.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed for every random stream; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// Player name; skips the name prompt.
    #[arg(long)]
    name: Option<String>,
}

/// Entry point for The Last Protocol command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let file = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };
    let settings = Settings::resolve(cli.seed, cli.name, file);
    info!(seed = settings.seed(), "starting mission");

    let (hacking, ambient) = settings.systems();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(
        stdin.lock(),
        stdout.lock(),
        settings.world(),
        hacking,
        ambient,
        settings.player_name().map(str::to_owned),
    );

    match session.run()? {
        Outcome::Ended(ending) => info!(?ending, "mission ended"),
        Outcome::Quit => info!("player quit"),
        Outcome::Closed => info!("input closed before the mission ended"),
    }
    Ok(())
}

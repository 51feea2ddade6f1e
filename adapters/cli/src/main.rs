#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that stages and fights skirmishes headlessly.

mod config;
mod console;
mod simulator;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use skirmish_core::BattleState;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::BattleConfig,
    console::{run_shell, status, stdio, LogSink},
    simulator::Simulator,
};

/// Headless battles between Hobbits, Wizards, Orcs and Nazgul.
#[derive(Debug, Parser)]
#[command(name = "skirmish", version)]
struct Cli {
    /// TOML file describing the sides and simulation tuning.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for every random source, overriding the config.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// File used by save and restore, overriding the config.
    #[arg(long, global = true)]
    save_path: Option<PathBuf>,

    /// Log filter directives; falls back to `RUST_LOG`, then `info`.
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Musters both sides from the config and fights until one side wins.
    Battle {
        /// Save the battle once it ends.
        #[arg(long)]
        save: bool,
    },
    /// Restores the saved battle and fights it out.
    Resume {
        /// Save the battle once it ends.
        #[arg(long)]
        save: bool,
    },
    /// Reads control commands from standard input.
    Shell {
        /// Muster the configured sides before the first prompt.
        #[arg(long)]
        muster: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref())?;

    let mut config = BattleConfig::load(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.reseed(seed);
    }
    if let Some(path) = cli.save_path {
        config.save_path = path;
    }

    let mut sim = Simulator::new(&config, LogSink)?;
    match cli.mode.unwrap_or(Mode::Battle { save: false }) {
        Mode::Battle { save } => {
            sim.muster_all(&config)?;
            fight(&mut sim, save)
        }
        Mode::Resume { save } => {
            sim.restore()?;
            fight(&mut sim, save)
        }
        Mode::Shell { muster } => {
            if muster {
                sim.muster_all(&config)?;
            }
            run_shell(&mut sim, &mut stdio())
        }
    }
}

fn fight(sim: &mut Simulator<LogSink>, save: bool) -> Result<()> {
    sim.run()?;
    let state = sim.play_out()?;
    let view = sim.view();
    print!("{}", status(&view, sim.elapsed()));

    if let BattleState::Concluded { winner } = state {
        let name = view.side(winner).map_or("unknown", |side| side.name.as_str());
        println!("{name} wins");
    }
    if save {
        sim.save()?;
    }
    info!(state = ?state, "battle finished");
    Ok(())
}

fn init_tracing(directives: Option<&str>) -> Result<()> {
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["skirmish", "shell", "--muster", "--seed", "9"])
            .expect("valid arguments");
        assert_eq!(cli.seed, Some(9));
        assert!(matches!(cli.mode, Some(Mode::Shell { muster: true })));
    }

    #[test]
    fn battle_is_the_default_mode() {
        let cli = Cli::try_parse_from(["skirmish"]).expect("valid arguments");
        assert!(cli.mode.is_none());
    }
}

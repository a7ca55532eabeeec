//! linkicon - favicon resolution and network-locality service for a
//! self-hosted link directory.

mod cli;
mod config;
mod core;
mod embed;
mod fetch;
mod logger;
mod probe;
mod resolver;
mod store;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{LinkiconConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = init_config(LinkiconConfig::load(&cli)?);

    match &cli.command {
        Commands::Init { dry, force } => cli::init::write_config(&config, *dry, *force),
        Commands::Serve { .. } => cli::serve::serve(),
        Commands::Resolve { args } => cli::resolve::run_resolve(args, &config),
        Commands::Classify { urls } => {
            cli::classify::run_classify(urls);
            Ok(())
        }
        Commands::Probe { target } => cli::network::run_probe(target, &config),
        Commands::Network { origin, medium } => {
            cli::network::run_network(origin, medium.as_deref(), &config)
        }
    }
}

//! Chirp - static site generator and model health checker for a micro-blog.

mod cli;
mod config;
mod embed;
mod generator;
mod health;
mod logger;
mod post;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match &cli.command {
        Commands::Build { args } => {
            cli::build::run(args)?;
            Ok(ExitCode::SUCCESS)
        }
        // The rebuild signal becomes an exit code only here, at the process boundary.
        Commands::Health { args } => cli::health::run(args).map(|signal| signal.exit_code()),
    }
}

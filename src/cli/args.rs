//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Micro-blog site generator and model health checker
#[derive(Parser, Debug, Clone)]
#[command(name = "chirp", version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render posts, index and RSS feed into the output directory
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },

    /// Probe model providers and record their status.
    ///
    /// Exits with 10 when a critical model changed state, 0 otherwise.
    #[command(visible_alias = "h")]
    Health {
        #[command(flatten)]
        args: HealthArgs,
    },
}

/// Build command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Config file path (the site root is its parent directory)
    #[arg(short = 'C', long, default_value = "config.json", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Output directory path (overrides `build.output`)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Override site URL for deployment.
    ///
    /// Useful when the production URL differs from the one in config.json,
    /// e.g. when building a preview.
    #[arg(short = 'U', long = "site-url", value_hint = clap::ValueHint::Url)]
    pub site_url: Option<String>,
}

/// Health command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct HealthArgs {
    /// Provider config file. Without it the built-in provider list is used.
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub providers: Option<PathBuf>,

    /// Credential store mapping provider id to API key
    /// (default: ~/.config/chirp/credentials.json)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub credentials: Option<PathBuf>,

    /// Directory holding model-status.json and model-health-state.json
    #[arg(long, default_value = "static", value_hint = clap::ValueHint::DirPath)]
    pub out_dir: PathBuf,
}

//! `chirp health`: probe providers and persist their status.

use crate::cli::HealthArgs;
use crate::config::{CredentialStore, HealthConfig};
use crate::health::{CheckPaths, CheckTime, HttpProber, RebuildSignal, run_check};
use crate::log;
use anyhow::{Context, Result};

pub fn run(args: &HealthArgs) -> Result<RebuildSignal> {
    let store_path = args
        .credentials
        .clone()
        .unwrap_or_else(CredentialStore::default_path);
    let store = CredentialStore::load(&store_path)?;

    let config = match &args.providers {
        Some(path) => HealthConfig::load(path, &store)?,
        None => HealthConfig::embedded(&store)?,
    };
    if config.providers.is_empty() {
        log!("warning"; "no providers configured");
    }

    let prober = HttpProber::new(&config.probe)?;
    let paths = CheckPaths::in_dir(&args.out_dir);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let (signal, _) = runtime.block_on(run_check(&config, &prober, &paths, CheckTime::now()))?;
    Ok(signal)
}

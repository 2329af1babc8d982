//! One health-check run.
//!
//! ```text
//! load state ─► for each provider { skip | probe } ─► aggregate
//!            ─► compare with previous snapshot ─► persist ─► RebuildSignal
//! ```
//!
//! Providers and models are probed one at a time.

use super::change::{RebuildSignal, detect_changes, is_critical};
use super::probe::Prober;
use super::snapshot::{ModelStatus, ProviderStatus, ProviderStatuses, SNAPSHOT_FILE, Snapshot};
use super::state::{CheckState, ProbeDecision, STATE_FILE, should_probe};
use crate::config::{HealthConfig, ProviderConfig};
use crate::utils::{date, plural_count};
use crate::{debug, log};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Where the snapshot and state live.
#[derive(Debug, Clone)]
pub struct CheckPaths {
    pub snapshot: PathBuf,
    pub state: PathBuf,
}

impl CheckPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            snapshot: dir.join(SNAPSHOT_FILE),
            state: dir.join(STATE_FILE),
        }
    }
}

/// The instant a run started, as unix seconds and as the display stamp.
#[derive(Debug, Clone)]
pub struct CheckTime {
    pub unix_secs: f64,
    pub display: String,
}

impl CheckTime {
    pub fn now() -> Self {
        let unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        Self {
            unix_secs,
            display: date::format_display(date::now_local()),
        }
    }
}

/// Aggregated result of probing every provider.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub snapshot: Snapshot,
    pub state: CheckState,
    /// Number of models probed.
    pub probed: usize,
    /// Ids of providers skipped as fresh.
    pub skipped: Vec<String>,
}

/// Probe (or carry over) every configured provider.
pub async fn check_providers<P: Prober>(
    config: &HealthConfig,
    prober: &P,
    previous: Option<&Snapshot>,
    mut state: CheckState,
    time: &CheckTime,
) -> RunOutcome {
    let mut providers = ProviderStatuses::default();
    let mut probed = 0;
    let mut skipped = Vec::new();

    for provider in &config.providers {
        let decision = should_probe(
            provider,
            &state,
            time.unix_secs,
            config.probe.stale_interval_secs,
        );

        if let ProbeDecision::Skip { elapsed_secs } = decision {
            log!(
                "skip";
                "{} (checked {}s ago, < {}s)",
                provider.name,
                elapsed_secs as i64,
                config.probe.stale_interval_secs
            );
            match previous.and_then(|s| s.providers.get(&provider.id)) {
                Some(old) => providers.insert(provider.id.as_str(), old.clone()),
                None => debug!("skip"; "no previous result for {}", provider.id),
            }
            skipped.push(provider.id.clone());
            continue;
        }

        if !provider.is_critical() {
            state.record_check(&provider.id, time.unix_secs);
        }

        log!("health"; "{}", provider.name);
        let status = probe_provider(provider, prober).await;
        probed += status.models.len();
        providers.insert(provider.id.as_str(), status);
    }

    RunOutcome {
        snapshot: Snapshot {
            providers,
            last_updated: time.display.clone(),
        },
        state,
        probed,
        skipped,
    }
}

async fn probe_provider<P: Prober>(provider: &ProviderConfig, prober: &P) -> ProviderStatus {
    let mut status = ProviderStatus::new(provider);
    for model in &provider.models {
        let result = prober
            .probe(&provider.base_url, provider.api_key.as_deref(), &model.id)
            .await;

        match (&result.latency, &result.error) {
            (_, Some(error)) => log!("probe"; "{}: {} ({})", model.display, result.status, error),
            (Some(latency), None) => log!("probe"; "{}: {} {}", model.display, result.status, latency),
            (None, None) => log!("probe"; "{}: {}", model.display, result.status),
        }
        status.models.push(ModelStatus::from_result(model, result));
    }
    status
}

/// Run a full check against the files in `paths`.
///
/// A state write failure is a warning; a snapshot write failure is an error.
pub async fn run_check<P: Prober>(
    config: &HealthConfig,
    prober: &P,
    paths: &CheckPaths,
    time: CheckTime,
) -> Result<(RebuildSignal, RunOutcome)> {
    let state = CheckState::load(&paths.state);
    let previous = Snapshot::load(&paths.snapshot);

    let outcome = check_providers(config, prober, previous.as_ref(), state, &time).await;

    let changes = detect_changes(
        previous.as_ref(),
        &outcome.snapshot,
        &config.thresholds,
        is_critical,
    );
    for change in &changes {
        log!("change"; "{}", change);
    }

    if let Err(e) = outcome.state.save(&paths.state) {
        log!("warning"; "{:#}", e);
    }
    outcome.snapshot.save(&paths.snapshot)?;

    let signal = RebuildSignal::from_changes(&changes);
    log!(
        "health";
        "{} probed, {} skipped: {}",
        plural_count(outcome.probed, "model"),
        plural_count(outcome.skipped.len(), "provider"),
        match signal {
            RebuildSignal::Changed => "status changed, rebuild",
            RebuildSignal::Unchanged => "no change",
        }
    );
    Ok((signal, outcome))
}

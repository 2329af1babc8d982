//! Check state (`model-health-state.json`): when each non-critical
//! provider was last probed, as unix seconds.

use crate::config::ProviderConfig;
use crate::debug;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const STATE_FILE: &str = "model-health-state.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckState {
    #[serde(default)]
    pub last_check: BTreeMap<String, f64>,
}

impl CheckState {
    /// Read the state file. Missing or corrupt files yield an empty state.
    pub fn load(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            debug!("health"; "ignoring corrupt {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::utils::fs::write_file(path, &json)
            .with_context(|| format!("failed to save state {}", path.display()))
    }

    /// Last check of a provider; never checked counts as 0.
    pub fn last_check(&self, provider_id: &str) -> f64 {
        self.last_check.get(provider_id).copied().unwrap_or(0.0)
    }

    pub fn record_check(&mut self, provider_id: &str, now: f64) {
        self.last_check.insert(provider_id.to_string(), now);
    }
}

/// Whether a provider is probed this run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeDecision {
    Probe,
    /// Checked `elapsed_secs` ago, within the stale interval.
    Skip { elapsed_secs: f64 },
}

/// Critical providers are always probed; others only once their last check
/// is at least `stale_interval_secs` old.
pub fn should_probe(
    provider: &ProviderConfig,
    state: &CheckState,
    now: f64,
    stale_interval_secs: u64,
) -> ProbeDecision {
    if provider.is_critical() {
        return ProbeDecision::Probe;
    }

    let elapsed_secs = now - state.last_check(&provider.id);
    if elapsed_secs < stale_interval_secs as f64 {
        ProbeDecision::Skip { elapsed_secs }
    } else {
        ProbeDecision::Probe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use tempfile::TempDir;

    const NOW: f64 = 1_770_000_000.0;

    fn provider(id: &str, critical: bool) -> ProviderConfig {
        ProviderConfig {
            id: id.into(),
            name: id.into(),
            icon: String::new(),
            base_url: "http://localhost".into(),
            api_key: None,
            models: vec![ModelConfig {
                id: "m".into(),
                display: "M".into(),
                critical,
                star: false,
            }],
        }
    }

    fn state_with(id: &str, ago: f64) -> CheckState {
        let mut state = CheckState::default();
        state.record_check(id, NOW - ago);
        state
    }

    #[test]
    fn test_stale_interval_boundaries() {
        let free = provider("free", false);

        assert!(matches!(
            should_probe(&free, &state_with("free", 1799.0), NOW, 1800),
            ProbeDecision::Skip { .. }
        ));
        assert_eq!(
            should_probe(&free, &state_with("free", 1801.0), NOW, 1800),
            ProbeDecision::Probe
        );
        assert_eq!(
            should_probe(&free, &CheckState::default(), NOW, 1800),
            ProbeDecision::Probe
        );
    }

    #[test]
    fn test_skip_reports_elapsed() {
        let free = provider("free", false);
        assert_eq!(
            should_probe(&free, &state_with("free", 60.0), NOW, 1800),
            ProbeDecision::Skip { elapsed_secs: 60.0 }
        );
    }

    #[test]
    fn test_critical_always_probed() {
        let paid = provider("paid", true);
        assert_eq!(
            should_probe(&paid, &state_with("paid", 1.0), NOW, 1800),
            ProbeDecision::Probe
        );
    }

    #[test]
    fn test_state_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STATE_FILE);

        let state = state_with("free", 10.0);
        state.save(&path).unwrap();
        assert_eq!(CheckState::load(&path), state);

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(json["last_check"]["free"].is_f64());
    }

    #[test]
    fn test_load_missing_or_corrupt_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STATE_FILE);
        assert_eq!(CheckState::load(&path), CheckState::default());

        fs::write(&path, "not json").unwrap();
        assert_eq!(CheckState::load(&path), CheckState::default());
        assert_eq!(CheckState::load(&path).last_check("x"), 0.0);
    }
}

//! Health check configuration (`providers.json`).
//!
//! ```json
//! {
//!   "providers": {
//!     "groq": {"name": "Groq", "icon": "⚡", "baseUrl": "https://api.groq.com/openai/v1",
//!              "apiKeyEnv": "GROQ_API_KEY",
//!              "models": [{"id": "llama-3.3-70b-versatile", "display": "Llama 3.3 70B", "critical": true}]}
//!   },
//!   "probe": {"timeout_secs": 20, "max_tokens": 5, "stale_interval_secs": 1800},
//!   "thresholds": {"critical": {"good_ms": 2000, "degraded_ms": 5000},
//!                  "standard": {"good_ms": 5000, "degraded_ms": 10000}}
//! }
//! ```
//!
//! Provider order is preserved. API keys are resolved once at load time.

use super::{ConfigError, CredentialStore};
use crate::log;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// A model to probe.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelConfig {
    /// Model id sent in the request body.
    pub id: String,
    /// Human-readable name; also the identity used across snapshots.
    pub display: String,
    #[serde(default)]
    pub critical: bool,
    /// Display-only highlight.
    #[serde(default)]
    pub star: bool,
}

/// A provider with its resolved API key.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub models: Vec<ModelConfig>,
}

impl ProviderConfig {
    /// A provider is critical when any of its models is.
    pub fn is_critical(&self) -> bool {
        self.models.iter().any(|m| m.critical)
    }
}

/// Provider entry as written in the file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProvider {
    name: String,
    #[serde(default)]
    icon: String,
    base_url: String,
    #[serde(default)]
    api_key_env: Option<String>,
    #[serde(default)]
    models: Vec<ModelConfig>,
}

/// `probe` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// `max_tokens` of the probe completion.
    pub max_tokens: u32,
    /// Minimum age of a non-critical provider's last check before it is probed again.
    pub stale_interval_secs: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            max_tokens: 5,
            stale_interval_secs: 1800,
        }
    }
}

impl ProbeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Latency bucket boundaries in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatencyThreshold {
    /// Below this: good.
    pub good_ms: f64,
    /// Below this: degraded; at or above: bad.
    pub degraded_ms: f64,
}

/// `thresholds` section.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub critical: LatencyThreshold,
    pub standard: LatencyThreshold,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            critical: LatencyThreshold {
                good_ms: 2000.0,
                degraded_ms: 5000.0,
            },
            standard: LatencyThreshold {
                good_ms: 5000.0,
                degraded_ms: 10000.0,
            },
        }
    }
}

impl Thresholds {
    pub fn for_model(&self, critical: bool) -> &LatencyThreshold {
        if critical {
            &self.critical
        } else {
            &self.standard
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawHealthConfig {
    // serde_json preserves insertion order (preserve_order feature)
    providers: Map<String, Value>,
    #[serde(default)]
    probe: ProbeSettings,
    #[serde(default)]
    thresholds: Thresholds,
}

/// Everything the health checker needs, loaded once per run.
#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub providers: Vec<ProviderConfig>,
    pub probe: ProbeSettings,
    pub thresholds: Thresholds,
}

impl HealthConfig {
    /// Load from a `providers.json` file.
    pub fn load(path: &Path, store: &CredentialStore) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_json(&content, store, env_lookup)
    }

    /// The provider list compiled into the binary.
    pub fn embedded(store: &CredentialStore) -> Result<Self, ConfigError> {
        Self::from_json(crate::embed::DEFAULT_PROVIDERS, store, env_lookup)
    }

    /// Parse and resolve API keys with `env` standing in for the process environment.
    pub fn from_json(
        content: &str,
        store: &CredentialStore,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw: RawHealthConfig = serde_json::from_str(content)?;

        let mut providers = Vec::with_capacity(raw.providers.len());
        for (id, value) in raw.providers {
            let entry: RawProvider = serde_json::from_value(value)?;
            if entry.base_url.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "providers.{id}.baseUrl is empty"
                )));
            }
            let api_key = resolve_api_key(&id, entry.api_key_env.as_deref(), store, &env);
            providers.push(ProviderConfig {
                name: entry.name,
                icon: entry.icon,
                base_url: entry.base_url.trim_end_matches('/').to_string(),
                models: entry.models,
                api_key,
                id,
            });
        }

        let config = Self {
            providers,
            probe: raw.probe,
            thresholds: raw.thresholds,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for t in [&self.thresholds.critical, &self.thresholds.standard] {
            if t.good_ms > t.degraded_ms {
                return Err(ConfigError::Validation(format!(
                    "thresholds: good_ms ({}) must not exceed degraded_ms ({})",
                    t.good_ms, t.degraded_ms
                )));
            }
        }
        if self.probe.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "probe.timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Environment variable first, then the credential store. No key is a warning, not an error.
fn resolve_api_key(
    provider_id: &str,
    env_name: Option<&str>,
    store: &CredentialStore,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let from_env = env_name
        .and_then(&env)
        .filter(|value| !value.trim().is_empty());
    if from_env.is_some() {
        return from_env;
    }

    if let Some(key) = store.get(provider_id) {
        return Some(key.to_string());
    }

    match env_name {
        Some(name) => log!("warning"; "{} not set, probing {} without authorization", name, provider_id),
        None => log!("warning"; "no API key for {}, probing without authorization", provider_id),
    }
    None
}

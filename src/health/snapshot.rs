//! The persisted status snapshot (`model-status.json`).
//!
//! ```json
//! {
//!   "providers": {
//!     "groq": {"name": "Groq", "icon": "⚡",
//!              "models": [{"display": "Llama 3.3 70B", "status": "up",
//!                          "latency": "812.40ms", "critical": true}]}
//!   },
//!   "last_updated": "2026-02-06 23:30:00"
//! }
//! ```
//!
//! Providers keep configuration order. The status page reads this file
//! directly, so field names and the latency string form are fixed.

use super::status::{HealthResult, HealthStatus, Latency};
use crate::config::{ModelConfig, ProviderConfig};
use crate::debug;
use anyhow::{Context, Result};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const SNAPSHOT_FILE: &str = "model-status.json";

/// One model's recorded status.
///
/// Reading is lenient: an unknown `status` becomes `error` and a non-string
/// `error` (e.g. a bare HTTP code) is stringified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub display: String,
    #[serde(deserialize_with = "lenient_status")]
    pub status: HealthStatus,
    #[serde(default)]
    pub latency: Option<Latency>,
    #[serde(default)]
    pub critical: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub star: bool,
    #[serde(
        default,
        deserialize_with = "scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}

fn lenient_status<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HealthStatus, D::Error> {
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw.clone()).unwrap_or_else(|_| {
        debug!("health"; "unknown status {} read as error", raw);
        HealthStatus::Error
    }))
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Unreadable model entries are dropped one by one instead of failing the file.
fn lenient_models<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ModelStatus>, D::Error> {
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            serde_json::from_value(entry)
                .inspect_err(|e| debug!("health"; "skipping unreadable model entry: {}", e))
                .ok()
        })
        .collect())
}

impl ModelStatus {
    pub fn from_result(model: &ModelConfig, result: HealthResult) -> Self {
        Self {
            display: model.display.clone(),
            status: result.status,
            latency: result.latency,
            critical: model.critical,
            star: model.star,
            error: result.error,
        }
    }
}

/// One provider's recorded models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, deserialize_with = "lenient_models")]
    pub models: Vec<ModelStatus>,
}

impl ProviderStatus {
    pub fn new(provider: &ProviderConfig) -> Self {
        Self {
            name: provider.name.clone(),
            icon: provider.icon.clone(),
            models: Vec::with_capacity(provider.models.len()),
        }
    }

    pub fn model(&self, display: &str) -> Option<&ModelStatus> {
        self.models.iter().find(|m| m.display == display)
    }
}

/// Ordered map of provider id to status, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderStatuses(Vec<(String, ProviderStatus)>);

impl ProviderStatuses {
    pub fn get(&self, id: &str) -> Option<&ProviderStatus> {
        self.0.iter().find(|(key, _)| key == id).map(|(_, p)| p)
    }

    /// Insert or replace, keeping the original position on replace.
    pub fn insert(&mut self, id: impl Into<String>, status: ProviderStatus) {
        let id = id.into();
        match self.0.iter_mut().find(|(key, _)| *key == id) {
            Some(entry) => entry.1 = status,
            None => self.0.push((id, status)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProviderStatus)> {
        self.0.iter().map(|(id, p)| (id.as_str(), p))
    }
}

impl Serialize for ProviderStatuses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, status) in &self.0 {
            map.serialize_entry(id, status)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ProviderStatuses {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // serde_json::Map keeps file order (preserve_order)
        let map = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        map.into_iter()
            .map(|(id, value)| {
                serde_json::from_value(value)
                    .map(|status| (id, status))
                    .map_err(D::Error::custom)
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

/// A complete health snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub providers: ProviderStatuses,
    #[serde(default)]
    pub last_updated: String,
}

impl Snapshot {
    /// Read a previous snapshot. Missing or unreadable files yield `None`.
    pub fn load(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                debug!("health"; "cannot read {}: {}", path.display(), e);
                return None;
            }
        };
        serde_json::from_str(&content)
            .inspect_err(|e| debug!("health"; "ignoring corrupt {}: {}", path.display(), e))
            .ok()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        crate::utils::fs::write_file(path, &json)
            .with_context(|| format!("failed to save snapshot {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn model(display: &str, status: HealthStatus, ms: Option<f64>) -> ModelStatus {
        ModelStatus {
            display: display.into(),
            status,
            latency: ms.map(Latency::from_millis),
            critical: true,
            star: false,
            error: None,
        }
    }

    fn provider(name: &str, models: Vec<ModelStatus>) -> ProviderStatus {
        ProviderStatus {
            name: name.into(),
            icon: "*".into(),
            models,
        }
    }

    #[test]
    fn test_serialized_shape() {
        let mut providers = ProviderStatuses::default();
        let mut starred = model("Big", HealthStatus::Down, Some(812.4));
        starred.star = true;
        starred.error = Some("HTTP 401: nope".into());
        providers.insert("zeta", provider("Zeta", vec![starred]));
        providers.insert("alpha", provider("Alpha", vec![model("Small", HealthStatus::Up, None)]));

        let snapshot = Snapshot {
            providers,
            last_updated: "2026-02-06 23:30:00".into(),
        };
        let json = serde_json::to_value(&snapshot).unwrap();

        let keys: Vec<_> = json["providers"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);

        let big = &json["providers"]["zeta"]["models"][0];
        assert_eq!(big["status"], "down");
        assert_eq!(big["latency"], "812.40ms");
        assert_eq!(big["star"], true);
        assert_eq!(big["error"], "HTTP 401: nope");

        let small = json["providers"]["alpha"]["models"][0].as_object().unwrap();
        assert!(!small.contains_key("star"));
        assert!(!small.contains_key("error"));
        assert!(small["latency"].is_null());
        assert_eq!(json["last_updated"], "2026-02-06 23:30:00");
    }

    #[test]
    fn test_save_and_load_keep_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);

        let mut providers = ProviderStatuses::default();
        for id in ["c", "a", "b"] {
            providers.insert(id, provider(id, vec![model("m", HealthStatus::Up, Some(10.0))]));
        }
        let snapshot = Snapshot {
            providers,
            last_updated: "2026-02-06 23:30:00".into(),
        };
        snapshot.save(&path).unwrap();

        let loaded = Snapshot::load(&path).unwrap();
        assert_eq!(loaded, snapshot);
        let ids: Vec<_> = loaded.providers.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_load_legacy_snapshot() {
        let json = r#"{"providers": {"p": {"name": "P", "icon": "x", "models": [
            {"display": "M", "status": "rate_limited", "latency": "95.5ms", "critical": false}
        ]}}, "last_updated": "2026-01-01 00:00:00"}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        let m = snapshot.providers.get("p").unwrap().model("M").unwrap();
        assert_eq!(m.status, HealthStatus::RateLimited);
        assert_eq!(m.latency.unwrap().millis(), 95.5);
    }

    #[test]
    fn test_load_missing_or_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        assert!(Snapshot::load(&path).is_none());

        fs::write(&path, "{\"providers\": 3").unwrap();
        assert!(Snapshot::load(&path).is_none());
    }

    #[test]
    fn test_lenient_model_entries() {
        let json = r#"{"providers": {"p": {"name": "P", "models": [
            {"display": "Coded", "status": "down", "latency": null, "error": 401},
            {"display": "Odd", "status": "degraded", "latency": "10ms"},
            {"display": "Broken", "status": "up", "latency": "fast"},
            {"status": "up"},
            {"display": "Fine", "status": "up", "latency": 120}
        ]}}}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        let p = snapshot.providers.get("p").unwrap();

        let displays: Vec<_> = p.models.iter().map(|m| m.display.as_str()).collect();
        assert_eq!(displays, vec!["Coded", "Odd", "Fine"]);
        assert_eq!(p.model("Coded").unwrap().error.as_deref(), Some("401"));
        assert_eq!(p.model("Odd").unwrap().status, HealthStatus::Error);
        assert_eq!(p.model("Fine").unwrap().latency.unwrap().millis(), 120.0);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut providers = ProviderStatuses::default();
        providers.insert("a", provider("A", vec![]));
        providers.insert("b", provider("B", vec![]));
        providers.insert("a", provider("A2", vec![]));

        assert_eq!(providers.iter().count(), 2);
        assert_eq!(providers.get("a").unwrap().name, "A2");
        assert_eq!(providers.iter().next().unwrap().0, "a");
    }
}

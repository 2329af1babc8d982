//! Change detection between two snapshots.
//!
//! Only participating models (by default: `critical` ones) are compared.
//! A change is a status transition or a move between latency buckets;
//! a missing previous snapshot or a newly seen model also counts.

use super::snapshot::{ModelStatus, Snapshot};
use crate::config::{LatencyThreshold, Thresholds};
use std::fmt;

/// Coarse latency class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyBucket {
    Good,
    Degraded,
    Bad,
}

impl LatencyBucket {
    /// `< good_ms` → good, `< degraded_ms` → degraded, otherwise bad.
    pub fn classify(ms: f64, threshold: &LatencyThreshold) -> Self {
        if ms < threshold.good_ms {
            Self::Good
        } else if ms < threshold.degraded_ms {
            Self::Degraded
        } else {
            Self::Bad
        }
    }

    /// Bucket of a recorded model; absent latency has none.
    pub fn of(model: &ModelStatus, thresholds: &Thresholds) -> Option<Self> {
        let threshold = thresholds.for_model(model.critical);
        model
            .latency
            .map(|latency| Self::classify(latency.millis(), threshold))
    }
}

impl fmt::Display for LatencyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Good => "good",
            Self::Degraded => "degraded",
            Self::Bad => "bad",
        })
    }
}

/// What changed for one model.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeKind {
    NewModel { status: String },
    Status { from: String, to: String },
    Latency { from: String, to: String },
}

/// A detected change.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// No previous snapshot to compare against.
    NoPrevious,
    Model {
        provider: String,
        model: String,
        kind: ChangeKind,
    },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPrevious => f.write_str("no previous snapshot"),
            Self::Model {
                provider,
                model,
                kind,
            } => match kind {
                ChangeKind::NewModel { status } => write!(f, "{provider}/{model}: none → {status}"),
                ChangeKind::Status { from, to } | ChangeKind::Latency { from, to } => {
                    write!(f, "{provider}/{model}: {from} → {to}")
                }
            },
        }
    }
}

/// Whether the downstream site should be rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildSignal {
    Unchanged,
    Changed,
}

impl RebuildSignal {
    pub fn from_changes(changes: &[Change]) -> Self {
        if changes.is_empty() {
            Self::Unchanged
        } else {
            Self::Changed
        }
    }

    /// 10 asks the scheduler to rebuild.
    pub const fn code(self) -> u8 {
        match self {
            Self::Changed => 10,
            Self::Unchanged => 0,
        }
    }

    pub fn exit_code(self) -> std::process::ExitCode {
        std::process::ExitCode::from(self.code())
    }
}

/// Default participation predicate.
pub fn is_critical(model: &ModelStatus) -> bool {
    model.critical
}

/// Compare `current` against `previous`, considering only models for which
/// `participates` holds.
pub fn detect_changes(
    previous: Option<&Snapshot>,
    current: &Snapshot,
    thresholds: &Thresholds,
    participates: impl Fn(&ModelStatus) -> bool,
) -> Vec<Change> {
    let Some(previous) = previous else {
        return vec![Change::NoPrevious];
    };

    let mut changes = Vec::new();
    for (provider_id, provider) in current.providers.iter() {
        let old_provider = previous.providers.get(provider_id);

        for model in provider.models.iter().filter(|m| participates(m)) {
            let change = |kind| Change::Model {
                provider: provider_id.to_string(),
                model: model.display.clone(),
                kind,
            };

            let Some(old) = old_provider.and_then(|p| p.model(&model.display)) else {
                changes.push(change(ChangeKind::NewModel {
                    status: model.status.to_string(),
                }));
                continue;
            };

            if old.status != model.status {
                changes.push(change(ChangeKind::Status {
                    from: old.status.to_string(),
                    to: model.status.to_string(),
                }));
                continue;
            }

            if let (Some(from), Some(to)) = (
                LatencyBucket::of(old, thresholds),
                LatencyBucket::of(model, thresholds),
            ) && from != to
            {
                changes.push(change(ChangeKind::Latency {
                    from: from.to_string(),
                    to: to.to_string(),
                }));
            }
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::snapshot::{ProviderStatus, ProviderStatuses};
    use crate::health::status::{HealthStatus, Latency};

    fn model(display: &str, critical: bool, status: HealthStatus, ms: Option<f64>) -> ModelStatus {
        ModelStatus {
            display: display.into(),
            status,
            latency: ms.map(Latency::from_millis),
            critical,
            star: false,
            error: None,
        }
    }

    fn snapshot(models: Vec<ModelStatus>) -> Snapshot {
        let mut providers = ProviderStatuses::default();
        providers.insert(
            "p",
            ProviderStatus {
                name: "P".into(),
                icon: String::new(),
                models,
            },
        );
        Snapshot {
            providers,
            last_updated: String::new(),
        }
    }

    fn changes(old: Option<&Snapshot>, new: &Snapshot) -> Vec<Change> {
        detect_changes(old, new, &Thresholds::default(), is_critical)
    }

    #[test]
    fn test_bucket_boundaries() {
        let critical = Thresholds::default().critical;
        assert_eq!(LatencyBucket::classify(1999.0, &critical), LatencyBucket::Good);
        assert_eq!(LatencyBucket::classify(2000.0, &critical), LatencyBucket::Degraded);
        assert_eq!(LatencyBucket::classify(4999.99, &critical), LatencyBucket::Degraded);
        assert_eq!(LatencyBucket::classify(5000.0, &critical), LatencyBucket::Bad);

        let standard = Thresholds::default().standard;
        assert_eq!(LatencyBucket::classify(4000.0, &standard), LatencyBucket::Good);
        assert_eq!(LatencyBucket::classify(10000.0, &standard), LatencyBucket::Bad);
    }

    #[test]
    fn test_no_previous_is_changed() {
        let new = snapshot(vec![]);
        assert_eq!(changes(None, &new), vec![Change::NoPrevious]);
    }

    #[test]
    fn test_status_transition_of_critical_model() {
        let old = snapshot(vec![model("M", true, HealthStatus::Up, Some(500.0))]);
        let new = snapshot(vec![model("M", true, HealthStatus::Down, Some(500.0))]);

        let found = changes(Some(&old), &new);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].to_string(), "p/M: up → down");
    }

    #[test]
    fn test_same_status_same_bucket_is_unchanged() {
        let old = snapshot(vec![model("M", true, HealthStatus::Up, Some(500.0))]);
        let new = snapshot(vec![model("M", true, HealthStatus::Up, Some(1500.0))]);
        assert!(changes(Some(&old), &new).is_empty());
    }

    #[test]
    fn test_latency_bucket_transition() {
        let old = snapshot(vec![model("M", true, HealthStatus::Up, Some(1999.0))]);
        let new = snapshot(vec![model("M", true, HealthStatus::Up, Some(2000.0))]);

        let found = changes(Some(&old), &new);
        assert_eq!(found[0].to_string(), "p/M: good → degraded");
    }

    #[test]
    fn test_absent_latency_has_no_bucket() {
        let old = snapshot(vec![model("M", true, HealthStatus::Up, None)]);
        let new = snapshot(vec![model("M", true, HealthStatus::Up, Some(9000.0))]);
        assert!(changes(Some(&old), &new).is_empty());
    }

    #[test]
    fn test_non_critical_flip_ignored() {
        let old = snapshot(vec![model("Free", false, HealthStatus::Up, Some(100.0))]);
        let new = snapshot(vec![model("Free", false, HealthStatus::Down, Some(9000.0))]);
        assert!(changes(Some(&old), &new).is_empty());
    }

    #[test]
    fn test_new_critical_model_is_changed() {
        let old = snapshot(vec![model("A", true, HealthStatus::Up, Some(100.0))]);
        let new = snapshot(vec![
            model("A", true, HealthStatus::Up, Some(100.0)),
            model("B", true, HealthStatus::Up, Some(100.0)),
        ]);

        let found = changes(Some(&old), &new);
        assert_eq!(found.len(), 1);
        assert!(matches!(
            &found[0],
            Change::Model { model, kind: ChangeKind::NewModel { .. }, .. } if model == "B"
        ));
        assert_eq!(found[0].to_string(), "p/B: none → up");
    }

    #[test]
    fn test_custom_predicate() {
        let old = snapshot(vec![model("Free", false, HealthStatus::Up, Some(100.0))]);
        let new = snapshot(vec![model("Free", false, HealthStatus::Timeout, Some(100.0))]);

        let all = detect_changes(Some(&old), &new, &Thresholds::default(), |_| true);
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_rebuild_signal() {
        assert_eq!(RebuildSignal::from_changes(&[]), RebuildSignal::Unchanged);
        assert_eq!(
            RebuildSignal::from_changes(&[Change::NoPrevious]),
            RebuildSignal::Changed
        );
        assert_eq!(RebuildSignal::Changed.code(), 10);
        assert_eq!(RebuildSignal::Unchanged.code(), 0);
    }
}

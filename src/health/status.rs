//! Probe outcomes: status, latency and error snippet.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified outcome of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Up,
    Down,
    RateLimited,
    ServerError,
    Timeout,
    Error,
}

impl HealthStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::Timeout => "timeout",
            Self::Error => "error",
        }
    }

    /// Classify an HTTP status code.
    pub const fn from_http(code: u16) -> Self {
        match code {
            200 => Self::Up,
            429 => Self::RateLimited,
            500.. => Self::ServerError,
            _ => Self::Down,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response latency in milliseconds.
///
/// Written as `"812.40ms"`; read back from that form or a bare number.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "RawLatency", into = "String")]
pub struct Latency(f64);

impl Latency {
    /// Round to two decimals.
    pub fn from_millis(ms: f64) -> Self {
        Self((ms * 100.0).round() / 100.0)
    }

    pub fn from_duration(elapsed: std::time::Duration) -> Self {
        Self::from_millis(elapsed.as_secs_f64() * 1000.0)
    }

    pub const fn millis(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Latency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}ms", self.0)
    }
}

impl From<Latency> for String {
    fn from(latency: Latency) -> Self {
        latency.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLatency {
    Number(f64),
    Text(String),
}

impl TryFrom<RawLatency> for Latency {
    type Error = String;

    fn try_from(raw: RawLatency) -> Result<Self, Self::Error> {
        let ms = match raw {
            RawLatency::Number(ms) => ms,
            RawLatency::Text(s) => {
                let trimmed = s.trim();
                trimmed
                    .strip_suffix("ms")
                    .unwrap_or(trimmed)
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| format!("invalid latency `{s}`"))?
            }
        };
        if ms.is_finite() && ms >= 0.0 {
            Ok(Self::from_millis(ms))
        } else {
            Err(format!("invalid latency `{ms}`"))
        }
    }
}

/// Result of probing one model.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthResult {
    pub status: HealthStatus,
    pub latency: Option<Latency>,
    /// At most [`ERROR_SNIPPET_CHARS`] characters.
    pub error: Option<String>,
}

/// Maximum length of a recorded error snippet.
pub const ERROR_SNIPPET_CHARS: usize = 160;

impl HealthResult {
    pub fn new(status: HealthStatus, latency: Option<Latency>) -> Self {
        Self {
            status,
            latency,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl AsRef<str>) -> Self {
        self.error = Some(crate::utils::truncate_chars(error.as_ref(), ERROR_SNIPPET_CHARS).to_string());
        self
    }
}

//! Chat-completion probes.
//!
//! A probe sends the smallest useful request to
//! `POST <base_url>/chat/completions` and classifies the outcome. Failures
//! are data: every probe yields a [`HealthResult`], never an error.

use super::status::{HealthResult, HealthStatus, Latency};
use crate::config::ProbeSettings;
use crate::debug;
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::json;
use std::error::Error as _;
use std::time::{Duration, Instant};

/// Probes one model of one provider.
#[allow(async_fn_in_trait)]
pub trait Prober {
    async fn probe(&self, base_url: &str, api_key: Option<&str>, model_id: &str) -> HealthResult;
}

/// Prober backed by a real HTTP client.
pub struct HttpProber {
    client: Client,
    max_tokens: u32,
}

impl HttpProber {
    pub fn new(settings: &ProbeSettings) -> Result<Self> {
        Self::with_timeout(settings.timeout(), settings.max_tokens)
    }

    pub fn with_timeout(timeout: Duration, max_tokens: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, max_tokens })
    }
}

impl Prober for HttpProber {
    async fn probe(&self, base_url: &str, api_key: Option<&str>, model_id: &str) -> HealthResult {
        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let body = json!({
            "model": model_id,
            "messages": [{"role": "user", "content": "hi"}],
            "max_tokens": self.max_tokens,
        });
        debug!("probe"; "POST {} ({})", url, model_id);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = api_key {
            request = request.bearer_auth(key);
        }

        let start = Instant::now();
        let response = request.send().await;
        let latency = Some(Latency::from_duration(start.elapsed()));

        match response {
            Ok(response) => {
                let code = response.status().as_u16();
                let status = HealthStatus::from_http(code);
                if status == HealthStatus::Up {
                    return HealthResult::new(status, latency);
                }
                let text = response.text().await.unwrap_or_default();
                HealthResult::new(status, latency).with_error(format!("HTTP {code}: {text}"))
            }
            Err(e) if e.is_timeout() => {
                HealthResult::new(HealthStatus::Timeout, latency).with_error(error_chain(&e))
            }
            Err(e) => HealthResult::new(HealthStatus::Error, latency).with_error(error_chain(&e)),
        }
    }
}

/// `error: source: source` for transport errors, whose top-level message is terse.
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

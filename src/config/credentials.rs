//! API key store.
//!
//! A JSON object mapping provider ids to keys, consulted when a provider's
//! `apiKeyEnv` variable is unset:
//!
//! ```json
//! {"openrouter": "sk-or-...", "groq": "gsk_..."}
//! ```

use super::ConfigError;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const DEFAULT_PATH: &str = "~/.config/chirp/credentials.json";

/// Provider API keys keyed by provider id.
#[derive(Clone, Default)]
pub struct CredentialStore {
    keys: BTreeMap<String, String>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("providers", &self.keys.keys().collect::<Vec<_>>())
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl CredentialStore {
    pub fn from_map(keys: BTreeMap<String, String>) -> Self {
        Self { keys }
    }

    /// Non-empty key for a provider.
    pub fn get(&self, provider_id: &str) -> Option<&str> {
        self.keys
            .get(provider_id)
            .map(String::as_str)
            .filter(|key| !key.trim().is_empty())
    }

    /// Load the store from `path`. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(ConfigError::Io(path.to_path_buf(), err)),
        };
        Ok(Self::from_map(serde_json::from_str(&content)?))
    }

    /// `~/.config/chirp/credentials.json`, tilde-expanded.
    pub fn default_path() -> PathBuf {
        PathBuf::from(shellexpand::tilde(DEFAULT_PATH).as_ref())
    }
}

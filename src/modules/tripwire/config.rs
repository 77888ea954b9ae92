// src/modules/tripwire/config.rs

use crate::modules::tripwire::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

// Handler rules, read from a JSON document. Unknown keys are a hard error so
// that a typo never silently disables a rule.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub banned_pattern: String,
    #[serde(default)]
    pub whitelist_pattern: String,
    #[serde(default)]
    pub response_template: String,
    #[serde(default)]
    pub report_template: String,
}

impl Settings {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    // Fills in the API key from the environment when the file leaves it out.
    pub fn with_fallback_api_key(mut self, api_key: Option<&str>) -> Self {
        if self.api_key.trim().is_empty() {
            if let Some(key) = api_key {
                self.api_key = key.to_string();
            }
        }
        self
    }

    // Regexes are checked by the matcher when it compiles them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.banned_pattern.is_empty() {
            return Err(ConfigError::MissingBannedPattern);
        }
        Ok(())
    }
}

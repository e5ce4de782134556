use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::secret::SigningSecret;

pub const API_KEY_ENV: &str = "MAPS_API_KEY";
pub const SIGNING_SECRET_ENV: &str = "MAPS_URL_SIGNING_SECRET";

/// Config file picked up when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = ".mapsign/config.json";

/// Map provider credentials. Both are optional so a partially configured
/// deployment can still report what it is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_secret: Option<String>,
}

/// Which credentials are present, without their values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConfigProbe {
    pub api_key_present: bool,
    pub signing_secret_present: bool,
    pub signing_secret_valid: bool,
}

impl MapsConfig {
    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: shown, source })?;
        Ok(config.normalized())
    }

    /// Build from environment-style lookups. `lookup` is usually
    /// `|k| std::env::var(k).ok()`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_key: lookup(API_KEY_ENV),
            signing_secret: lookup(SIGNING_SECRET_ENV),
        }
        .normalized()
    }

    /// Resolve the full chain: file (explicit path, else the default path if
    /// it exists), then environment on top.
    pub fn load(
        explicit: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let base = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).is_file() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            None => Self::default(),
        };
        let merged = base.overlay(Self::from_lookup(lookup));
        tracing::debug!(
            api_key = merged.api_key.is_some(),
            signing_secret = merged.signing_secret.is_some(),
            "resolved maps config"
        );
        Ok(merged)
    }

    /// Values set in `other` win.
    pub fn overlay(self, other: Self) -> Self {
        Self {
            api_key: other.api_key.or(self.api_key),
            signing_secret: other.signing_secret.or(self.signing_secret),
        }
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::Missing(API_KEY_ENV))
    }

    pub fn signing_secret(&self) -> Result<&str, ConfigError> {
        self.signing_secret
            .as_deref()
            .ok_or(ConfigError::Missing(SIGNING_SECRET_ENV))
    }

    pub fn probe(&self) -> ConfigProbe {
        let secret = self.signing_secret.as_deref();
        ConfigProbe {
            api_key_present: self.api_key.is_some(),
            signing_secret_present: secret.is_some(),
            signing_secret_valid: secret.is_some_and(|s| SigningSecret::from_base64(s).is_ok()),
        }
    }

    // Blank values count as unset.
    fn normalized(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            api_key: keep(self.api_key),
            signing_secret: keep(self.signing_secret),
        }
    }
}

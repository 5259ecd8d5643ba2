//! Server configuration.
//!
//! Read from `pestiform.toml` in the working directory when the file exists.
//! Every field has a default, so a partial file (or none at all) is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{PestiformError, Result};

/// File name looked up in the working directory by [`PestiformConfig::load_default`].
pub const CONFIG_FILE: &str = "pestiform.toml";

/// Complete server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PestiformConfig {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Serialized decision tree loaded at startup
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Remote services and their limits
    #[serde(default)]
    pub services: ServiceConfig,
}

impl Default for PestiformConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            model_path: default_model_path(),
            services: ServiceConfig::default(),
        }
    }
}

fn default_bind_addr() -> String { "127.0.0.1:5000".to_string() }
fn default_model_path() -> PathBuf { PathBuf::from("model/model_DT.json") }

// ── Remote services ───────────────────────────────────────────────────────────

/// Endpoints of the name resolver and PubChem, plus request deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Chemical Identifier Resolver structure endpoint
    #[serde(default = "default_resolver_url")]
    pub resolver_url: String,

    /// PubChem PUG-REST root
    #[serde(default = "default_pubchem_url")]
    pub pubchem_url: String,

    /// Per-request HTTP timeout
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Deadline for one full prediction (resolve + descriptors + classify)
    #[serde(default = "default_pipeline_deadline")]
    pub pipeline_deadline_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            resolver_url: default_resolver_url(),
            pubchem_url: default_pubchem_url(),
            http_timeout_secs: default_http_timeout(),
            pipeline_deadline_secs: default_pipeline_deadline(),
        }
    }
}

fn default_resolver_url() -> String { "https://cactus.nci.nih.gov/chemical/structure".to_string() }
fn default_pubchem_url() -> String { "https://pubchem.ncbi.nlm.nih.gov/rest/pug".to_string() }
fn default_http_timeout() -> u64 { 20 }
fn default_pipeline_deadline() -> u64 { 45 }

// ── Helper Methods ─────────────────────────────────────────────────────────────

impl PestiformConfig {
    /// Load from a TOML file
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| PestiformError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `pestiform.toml` from the working directory, falling back to defaults.
    pub fn load_default() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            info!(path = %path.display(), "Loading configuration");
            Self::from_toml(path)
        } else {
            info!("No {} found, using built-in defaults", CONFIG_FILE);
            Ok(Self::default())
        }
    }

    /// Hosts the outbound HTTP client may talk to.
    pub fn allowed_hosts(&self) -> Vec<String> {
        [&self.services.resolver_url, &self.services.pubchem_url]
            .iter()
            .filter_map(|u| url::Url::parse(u).ok())
            .filter_map(|u| u.host_str().map(String::from))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("services.resolver_url", &self.services.resolver_url),
            ("services.pubchem_url", &self.services.pubchem_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| PestiformError::Config(format!("{name}: {e}")))?;
            if parsed.host_str().is_none() {
                return Err(PestiformError::Config(format!("{name}: URL has no host")));
            }
        }
        if self.services.http_timeout_secs == 0 || self.services.pipeline_deadline_secs == 0 {
            return Err(PestiformError::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PestiformConfig::default();
        assert_eq!(config.model_path, PathBuf::from("model/model_DT.json"));
        assert!(config.services.resolver_url.starts_with("https://cactus.nci.nih.gov"));
        assert!(config.services.pipeline_deadline_secs > config.services.http_timeout_secs);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PestiformConfig::parse(
            r#"
            bind_addr = "0.0.0.0:8080"

            [services]
            http_timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.services.http_timeout_secs, 5);
        assert_eq!(config.services.pipeline_deadline_secs, 45);
        assert!(config.services.pubchem_url.contains("pubchem"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = PestiformConfig::parse("[services]\nhttp_timeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, PestiformError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_url() {
        let err = PestiformConfig::parse("[services]\npubchem_url = \"not a url\"\n").unwrap_err();
        assert!(err.to_string().contains("services.pubchem_url"));
    }

    #[test]
    fn test_allowed_hosts() {
        let hosts = PestiformConfig::default().allowed_hosts();
        assert_eq!(hosts, vec!["cactus.nci.nih.gov", "pubchem.ncbi.nlm.nih.gov"]);
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "model_path = \"artifacts/tree.json\"\n").unwrap();
        let config = PestiformConfig::from_toml(&path).unwrap();
        assert_eq!(config.model_path, PathBuf::from("artifacts/tree.json"));
    }
}

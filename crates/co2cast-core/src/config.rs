use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::Variant;
use crate::error::{Co2castError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Co2castConfig {
    #[serde(default)]
    pub variant: Variant,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Local path or http(s) URL. `None` uses the variant's bundled artifact.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

// Well-known environment keys
pub mod env_keys {
    pub const VARIANT: &str = "CO2CAST_VARIANT";
    pub const MODEL: &str = "CO2CAST_MODEL";
    pub const CACHE_DIR: &str = "CO2CAST_CACHE_DIR";
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
}

impl Co2castConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Co2castConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Defaults overlaid with process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(variant) = lookup(env_keys::VARIANT) {
            self.variant = variant.parse().map_err(Co2castError::Config)?;
        }
        if let Some(source) = lookup(env_keys::MODEL).filter(|s| !s.trim().is_empty()) {
            self.model.source = Some(source);
        }
        if let Some(dir) = lookup(env_keys::CACHE_DIR) {
            self.model.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(host) = lookup(env_keys::HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(env_keys::PORT) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Co2castError::Config(format!("Invalid port: {}", port)))?;
        }
        Ok(self)
    }

    pub fn model_source(&self) -> String {
        self.model
            .source
            .clone()
            .unwrap_or_else(|| self.variant.profile().default_artifact.to_string())
    }

    /// Where downloaded artifacts are kept.
    pub fn cache_dir(&self) -> PathBuf {
        match &self.model.cache_dir {
            Some(dir) => dir.clone(),
            None => dirs::cache_dir()
                .map(|d| d.join("co2cast"))
                .unwrap_or_else(|| PathBuf::from(".co2cast-cache")),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Co2castConfig::default();
        assert_eq!(config.variant, Variant::PerCapita);
        assert_eq!(config.model_source(), "models/co2_per_capita.json");
        assert_eq!(config.bind_addr(), "0.0.0.0:3001");
    }

    #[test]
    fn test_env_overrides() {
        let config = Co2castConfig::default()
            .with_env(env(&[
                ("CO2CAST_VARIANT", "total"),
                ("CO2CAST_MODEL", "https://example.com/model.json"),
                ("CO2CAST_CACHE_DIR", "/tmp/co2"),
                ("PORT", "8080"),
            ]))
            .unwrap();
        assert_eq!(config.variant, Variant::Total);
        assert_eq!(config.model_source(), "https://example.com/model.json");
        assert_eq!(config.cache_dir(), PathBuf::from("/tmp/co2"));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_variant_default_artifact_follows_variant() {
        let config = Co2castConfig::default()
            .with_env(env(&[("CO2CAST_VARIANT", "total"), ("CO2CAST_MODEL", " ")]))
            .unwrap();
        assert_eq!(config.model_source(), "models/co2_total.json");
    }

    #[test]
    fn test_invalid_env() {
        let result = Co2castConfig::default().with_env(env(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(Co2castError::Config(_))));
        let result = Co2castConfig::default().with_env(env(&[("CO2CAST_VARIANT", "weekly")]));
        assert!(matches!(result, Err(Co2castError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"variant":"total","server":{"host":"127.0.0.1","port":9000}}"#).unwrap();

        let config = Co2castConfig::from_file(&path).unwrap();
        assert_eq!(config.variant, Variant::Total);
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert!(config.model.source.is_none());
    }
}

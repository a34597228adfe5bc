use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Model used when neither the request nor the environment names one.
pub const DEFAULT_MODEL: &str = "qwen3:4b";

/// Hosts tried, in order, when no LLM base URL is configured.
pub const DEFAULT_FALLBACK_HOSTS: &[&str] = &[
    "172.28.80.1",
    "172.28.93.1",
    "172.19.16.1",
    "172.17.0.1",
    "172.20.0.1",
    "localhost",
    "127.0.0.1",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub port: u16,
    pub cors_origin: Option<String>,
    /// Rows returned by a raw dataset preview when the caller does not ask
    pub preview_rows: usize,
    pub suggestion_limit: usize,
    pub llm: LlmConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            static_dir: None,
            port: 8000,
            cors_origin: None,
            preview_rows: 50,
            suggestion_limit: 10,
            llm: LlmConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// Fixed base URL; when unset the candidates from `fallback_hosts` are tried
    pub base_url: Option<String>,
    pub port: u16,
    pub default_model: String,
    pub request_timeout_secs: u64,
    pub discovery_timeout_ms: u64,
    pub fallback_hosts: Vec<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            port: 11434,
            default_model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: 120,
            discovery_timeout_ms: 2000,
            fallback_hosts: DEFAULT_FALLBACK_HOSTS
                .iter()
                .map(|host| host.to_string())
                .collect(),
        }
    }
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }
}

impl AppConfig {
    /// Defaults, then the optional YAML file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        let values: HashMap<String, String> = Self::tracked_keys()
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();
        self.apply_map(&values);
    }

    /// Applies overrides from a key/value map; blank values are ignored.
    pub fn apply_map(&mut self, values: &HashMap<String, String>) {
        fn prioritized_value(values: &HashMap<String, String>, key: &str) -> Option<String> {
            values
                .get(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        }

        fn parsed<T: std::str::FromStr>(values: &HashMap<String, String>, key: &str) -> Option<T> {
            prioritized_value(values, key).and_then(|value| value.parse().ok())
        }

        if let Some(dir) = prioritized_value(values, "TIKTOK_INSIGHTS_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = prioritized_value(values, "TIKTOK_INSIGHTS_STATIC_DIR") {
            self.static_dir = Some(PathBuf::from(dir));
        }
        if let Some(port) = parsed(values, "TIKTOK_INSIGHTS_PORT") {
            self.port = port;
        }
        if let Some(origin) = prioritized_value(values, "TIKTOK_INSIGHTS_CORS_ORIGIN") {
            self.cors_origin = Some(origin);
        }

        // OLLAMA_API_BASE wins over OLLAMA_BASE_URL when both are set
        if let Some(url) = prioritized_value(values, "OLLAMA_API_BASE")
            .or_else(|| prioritized_value(values, "OLLAMA_BASE_URL"))
        {
            self.llm.base_url = Some(url);
        }
        if let Some(port) = parsed(values, "OLLAMA_PORT") {
            self.llm.port = port;
        }
        if let Some(model) = prioritized_value(values, "DEFAULT_OLLAMA_MODEL") {
            self.llm.default_model = model;
        }
        if let Some(secs) = parsed(values, "TIKTOK_INSIGHTS_LLM_TIMEOUT_SECS") {
            self.llm.request_timeout_secs = secs;
        }
        if let Some(ms) = parsed(values, "TIKTOK_INSIGHTS_DISCOVERY_TIMEOUT_MS") {
            self.llm.discovery_timeout_ms = ms;
        }
    }

    fn tracked_keys() -> Vec<&'static str> {
        vec![
            "TIKTOK_INSIGHTS_DATA_DIR",
            "TIKTOK_INSIGHTS_STATIC_DIR",
            "TIKTOK_INSIGHTS_PORT",
            "TIKTOK_INSIGHTS_CORS_ORIGIN",
            "OLLAMA_API_BASE",
            "OLLAMA_BASE_URL",
            "OLLAMA_PORT",
            "DEFAULT_OLLAMA_MODEL",
            "TIKTOK_INSIGHTS_LLM_TIMEOUT_SECS",
            "TIKTOK_INSIGHTS_DISCOVERY_TIMEOUT_MS",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.llm.default_model, "qwen3:4b");
        assert_eq!(config.llm.port, 11434);
        assert_eq!(config.llm.request_timeout(), Duration::from_secs(120));
        assert_eq!(config.llm.fallback_hosts.last().map(String::as_str), Some("127.0.0.1"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_map(&map(&[
            ("TIKTOK_INSIGHTS_DATA_DIR", "/srv/corpus"),
            ("TIKTOK_INSIGHTS_PORT", "9100"),
            ("OLLAMA_BASE_URL", "http://gpu-box:11434"),
            ("DEFAULT_OLLAMA_MODEL", "llama3.2"),
            ("TIKTOK_INSIGHTS_DISCOVERY_TIMEOUT_MS", "not-a-number"),
        ]));

        assert_eq!(config.data_dir, PathBuf::from("/srv/corpus"));
        assert_eq!(config.port, 9100);
        assert_eq!(config.llm.base_url.as_deref(), Some("http://gpu-box:11434"));
        assert_eq!(config.llm.default_model, "llama3.2");
        assert_eq!(config.llm.discovery_timeout_ms, 2000);
    }

    #[test]
    fn test_api_base_takes_precedence() {
        let mut config = AppConfig::default();
        config.apply_map(&map(&[
            ("OLLAMA_BASE_URL", "http://a:11434"),
            ("OLLAMA_API_BASE", "http://b:11434"),
        ]));
        assert_eq!(config.llm.base_url.as_deref(), Some("http://b:11434"));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_map(&map(&[("DEFAULT_OLLAMA_MODEL", "  ")]));
        assert_eq!(config.llm.default_model, DEFAULT_MODEL);
    }

    #[test]
    fn test_partial_yaml_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "data_dir: /tmp/corpus\nllm:\n  default_model: mistral")?;

        let config = AppConfig::from_file(file.path())?;
        assert_eq!(config.data_dir, PathBuf::from("/tmp/corpus"));
        assert_eq!(config.llm.default_model, "mistral");
        assert_eq!(config.llm.port, 11434);
        assert_eq!(config.preview_rows, 50);
        Ok(())
    }
}

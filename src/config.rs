use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const SOURCE_TOKEN_ENV: &str = "HANDLEFINDER_SOURCE_TOKEN";
pub const TARGET_TOKEN_ENV: &str = "HANDLEFINDER_TARGET_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub source: SourceApiConfig,

    pub target: TargetApiConfig,

    pub search: SearchConfig,

    pub server: ServerConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/handlefinder.db".to_string(),
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

/// The network whose following graph is walked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceApiConfig {
    pub base_url: String,

    pub auth_token: String,

    /// Upper bound on followed accounts inspected per search.
    pub max_results: u32,

    pub request_timeout_seconds: u64,
}

impl Default for SourceApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitter.com/2".to_string(),
            auth_token: String::new(),
            max_results: 1000,
            request_timeout_seconds: 5,
        }
    }
}

/// The network whose handles are discovered in source profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetApiConfig {
    pub base_url: String,

    pub auth_token: String,

    pub request_timeout_seconds: u64,
}

impl Default for TargetApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mastodon.social/api/v2".to_string(),
            auth_token: String::new(),
            request_timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Pause after every target lookup, in milliseconds. 0 disables pacing.
    pub enrichment_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enrichment_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,

    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });

        // A missing .env is the normal case.
        let _ = dotenvy::dotenv();
        config.apply_env_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Tokens may come from the environment so they stay out of config.toml.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(SOURCE_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.source.auth_token = token;
        }
        if let Some(token) = lookup(TARGET_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.target.auth_token = token;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("handlefinder").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".handlefinder").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, base_url) in [
            ("source", &self.source.base_url),
            ("target", &self.target.base_url),
        ] {
            if base_url.is_empty() {
                anyhow::bail!("{name}.base_url cannot be empty");
            }
            url::Url::parse(base_url)
                .with_context(|| format!("{name}.base_url is not a valid URL: {base_url}"))?;
        }

        if self.source.max_results == 0 {
            anyhow::bail!("source.max_results must be > 0");
        }

        if self.source.request_timeout_seconds == 0 || self.target.request_timeout_seconds == 0 {
            anyhow::bail!("request timeouts must be > 0");
        }

        Ok(())
    }
}

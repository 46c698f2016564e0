use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_STATS_URL: &str = "https://halostats.svc.halowaypoint.com";
pub const DEFAULT_DISCOVERY_URL: &str = "https://discovery-infiniteugc.svc.halowaypoint.com";
pub const DEFAULT_AUTHORING_URL: &str = "https://authoring-infiniteugc.svc.halowaypoint.com";

/// Base URLs of the three Waypoint services the bookmarker talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    pub stats_url: String,
    pub discovery_url: String,
    pub authoring_url: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            stats_url: DEFAULT_STATS_URL.to_string(),
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            authoring_url: DEFAULT_AUTHORING_URL.to_string(),
        }
    }
}

/// Overrides coming from CLI flags or their environment variables.
#[derive(Debug, Clone, Default)]
pub struct EndpointOverrides {
    pub stats_url: Option<String>,
    pub discovery_url: Option<String>,
    pub authoring_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    config_dir: PathBuf,
    pub stats_url: Option<String>,
    pub discovery_url: Option<String>,
    pub authoring_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Self::get_config_dir()?)
    }

    pub fn load_from(config_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        let config_file = config_dir.join(CONFIG_FILE);
        let (stats_url, discovery_url, authoring_url) = if config_file.exists() {
            let content = fs::read_to_string(&config_file).context("Failed to read config file")?;
            let config: HashMap<String, toml::Value> =
                toml::from_str(&content).context("Failed to parse config file")?;
            let api = config.get("api");
            let lookup = |key: &str| {
                api.and_then(|v| v.get(key))
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            };
            (
                lookup("stats_url"),
                lookup("discovery_url"),
                lookup("authoring_url"),
            )
        } else {
            (None, None, None)
        };

        Ok(Self {
            config_dir,
            stats_url,
            discovery_url,
            authoring_url,
        })
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join("infinite-bookmarker"))
            .context("Failed to determine config directory")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.config_dir.join("logs")
    }

    /// Resolve endpoints: override first, then config file, then the public hosts.
    pub fn endpoints(&self, overrides: &EndpointOverrides) -> Result<ApiEndpoints> {
        let defaults = ApiEndpoints::default();
        let pick = |flag: &Option<String>, file: &Option<String>, default: String| {
            let value = flag.clone().or_else(|| file.clone()).unwrap_or(default);
            validate_url(&value).map(|_| value)
        };

        Ok(ApiEndpoints {
            stats_url: pick(&overrides.stats_url, &self.stats_url, defaults.stats_url)?,
            discovery_url: pick(
                &overrides.discovery_url,
                &self.discovery_url,
                defaults.discovery_url,
            )?,
            authoring_url: pick(
                &overrides.authoring_url,
                &self.authoring_url,
                defaults.authoring_url,
            )?,
        })
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        if key.starts_with("api.") {
            validate_url(value)?;
        }

        let config_file = self.config_dir.join(CONFIG_FILE);
        let mut config: HashMap<String, toml::Value> = if config_file.exists() {
            let content = fs::read_to_string(&config_file).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            HashMap::new()
        };

        // Handle nested keys like "api.stats_url"
        if let Some((section, subkey)) = key.split_once('.') {
            let section_map = config
                .entry(section.to_string())
                .or_insert_with(|| toml::Value::Table(toml::value::Table::new()))
                .as_table_mut()
                .context("Invalid config structure")?;

            section_map.insert(subkey.to_string(), toml::Value::String(value.to_string()));
        } else {
            config.insert(key.to_string(), toml::Value::String(value.to_string()));
        }

        let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
        fs::write(&config_file, content).context("Failed to write config file")?;
        tracing::debug!(%key, "configuration updated");

        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let config_file = self.config_dir.join(CONFIG_FILE);
        if !config_file.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&config_file).context("Failed to read config file")?;
        let config: HashMap<String, toml::Value> =
            toml::from_str(&content).context("Failed to parse config file")?;

        let value = match key.split_once('.') {
            Some((section, subkey)) => config
                .get(section)
                .and_then(|v| v.as_table())
                .and_then(|table| table.get(subkey)),
            None => config.get(key),
        };

        Ok(value.and_then(|v| v.as_str()).map(|s| s.to_string()))
    }
}

fn validate_url(value: &str) -> Result<()> {
    let url = url::Url::parse(value).with_context(|| format!("Invalid URL: {}", value))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("Unsupported URL scheme '{}' in {}", url.scheme(), value);
    }
    Ok(())
}

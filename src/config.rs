use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Effective server configuration. Built once at startup (defaults, then
/// optional TOML file, then environment), immutable afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Number of log lines shown when the request doesn't say otherwise
    #[serde(default = "default_lines")]
    pub default_lines: usize,
    /// Client-side auto-refresh interval in seconds
    #[serde(default = "default_refresh")]
    pub refresh_interval: u64,
    /// Logical source name -> log file path
    #[serde(default = "default_sources")]
    pub sources: BTreeMap<String, String>,
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "admin123".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_lines() -> usize {
    500
}

fn default_refresh() -> u64 {
    10
}

fn default_sources() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("dev".to_string(), "x402-mvp-dev/data/app.log".to_string()),
        ("main".to_string(), "x402-mvp-main/data/app.log".to_string()),
    ])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
            port: default_port(),
            default_lines: default_lines(),
            refresh_interval: default_refresh(),
            sources: default_sources(),
        }
    }
}

impl Config {
    /// Parse a config from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        Ok(config)
    }

    /// Load a config from a file path; a missing file means defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    /// Apply `LOGVIEW_*` environment overrides on top of the loaded values.
    /// Values that fail to parse are skipped with a warning, not fatal.
    pub fn apply_env(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            match key.as_str() {
                "LOGVIEW_USERNAME" => self.username = value,
                "LOGVIEW_PASSWORD" => self.password = value,
                "LOGVIEW_PORT" => match value.parse() {
                    Ok(port) => self.port = port,
                    Err(_) => tracing::warn!(value = %value, "Ignoring invalid LOGVIEW_PORT"),
                },
                "LOGVIEW_DEFAULT_LINES" => match value.parse() {
                    Ok(n) => self.default_lines = n,
                    Err(_) => {
                        tracing::warn!(value = %value, "Ignoring invalid LOGVIEW_DEFAULT_LINES")
                    }
                },
                "LOGVIEW_REFRESH_INTERVAL" => match value.parse() {
                    Ok(secs) => self.refresh_interval = secs,
                    Err(_) => {
                        tracing::warn!(value = %value, "Ignoring invalid LOGVIEW_REFRESH_INTERVAL")
                    }
                },
                "LOGVIEW_SOURCES" => match parse_sources(&value) {
                    Some(sources) => self.sources = sources,
                    None => tracing::warn!(value = %value, "Ignoring invalid LOGVIEW_SOURCES"),
                },
                _ => {}
            }
        }
    }

    /// Resolve a logical source name to its filesystem path, expanding `~`
    pub fn resolve_source(&self, name: &str) -> Option<PathBuf> {
        self.sources
            .get(name)
            .map(|raw| PathBuf::from(shellexpand::tilde(raw).as_ref()))
    }
}

/// Parse a "name=path,name=path" source mapping
fn parse_sources(raw: &str) -> Option<BTreeMap<String, String>> {
    let mut sources = BTreeMap::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (name, path) = entry.split_once('=')?;
        if name.trim().is_empty() || path.trim().is_empty() {
            return None;
        }
        sources.insert(name.trim().to_string(), path.trim().to_string());
    }
    if sources.is_empty() {
        None
    } else {
        Some(sources)
    }
}

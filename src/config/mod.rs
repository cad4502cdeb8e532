use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TOKEN_ENV: &str = "MAPBOX_TOKEN";

fn default_hikes_url() -> String {
    "http://www.roanokeoutside.com/land/hiking/all-hikes/".to_string()
}
fn default_cache_file() -> PathBuf {
    PathBuf::from("hikes/data/all_hikes.json")
}
fn default_user_agent() -> String {
    concat!("hikemap/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_geocoding_endpoint() -> String {
    "https://api.mapbox.com/geocoding/v5/mapbox.places".to_string()
}
fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_read_timeout_secs() -> u64 {
    5
}

/// Settings for every component, loaded once and handed out explicitly.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_hikes_url")]
    pub hikes_url: String,
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Page fetch timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_geocoding_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Persist geocoded coordinates back into the cache file
    #[serde(default)]
    pub write_back: bool,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hikes_url: default_hikes_url(),
            cache_file: default_cache_file(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            geocoding: GeocodingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            token: None,
            endpoint: default_geocoding_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            write_back: false,
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or the first parseable file in the search
    /// path, or fall back to defaults. The token environment variable is
    /// applied on top.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {:?}", path);
                }
                Self::from_file(path)?
            }
            None => Self::search().unwrap_or_default(),
        };

        config.apply_env(std::env::var(TOKEN_ENV).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    fn search() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "loaded config");
                        return Some(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    /// A non-empty token from the environment overrides the file.
    pub fn apply_env(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.geocoding.token = Some(token);
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("hikemap.toml"));
    paths.push(PathBuf::from(".hikemap.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("hikemap").join("config.toml"));
        paths.push(config_dir.join("hikemap.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".hikemap.toml"));
    }

    paths
}

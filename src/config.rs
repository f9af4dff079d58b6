use eyre::{Context, Result};
use log::Level;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use wacloud::ClientConfig;

/// Overrides the configured Graph API host
pub const BASE_URL_ENV: &str = "WACLOUD_BASE_URL";

/// Overrides the configured default API version
pub const API_VERSION_ENV: &str = "WACLOUD_API_VERSION";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    /// Append logs here instead of stderr
    pub log_file: Option<PathBuf>,
    pub api: ClientConfig,
    #[serde(skip)]
    load_notes: Vec<(Level, String)>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            log_file: None,
            api: ClientConfig::default(),
            load_notes: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain, then apply env overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            let mut config =
                Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()))?;
            config.note(Level::Info, format!("Loaded config from: {}", path.display()));
            return Ok(config);
        }

        // Primary ~/.config/<project>/<project>.yml, then ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let mut candidates = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(project_name).join(format!("{}.yml", project_name)));
        }
        candidates.push(PathBuf::from(format!("{}.yml", project_name)));

        Ok(Self::load_first(&candidates))
    }

    /// First candidate that exists and parses; broken files are noted and skipped
    fn load_first(candidates: &[PathBuf]) -> Self {
        let mut notes = Vec::new();
        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(mut config) => {
                    notes.push((Level::Info, format!("Loaded config from: {}", path.display())));
                    config.load_notes = notes;
                    return config;
                }
                Err(e) => notes.push((Level::Warn, format!("Failed to load config from {}: {:#}", path.display(), e))),
            }
        }
        notes.push((Level::Info, "No config file found, using defaults".to_string()));
        Self {
            load_notes: notes,
            ..Self::default()
        }
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    fn note(&mut self, level: Level, message: String) {
        self.load_notes.push((level, message));
    }

    /// Config is loaded before the logger exists, so its messages are replayed here
    pub fn log_load_notes(&self) {
        for (level, message) in &self.load_notes {
            log::log!(*level, "{}", message);
        }
    }

    /// Apply `WACLOUD_*` overrides; empty values are ignored
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(version) = lookup(API_VERSION_ENV).filter(|v| !v.is_empty()) {
            self.api.api_version = version;
        }
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) const CONFIG_FILE: &str = "config.toml";
pub(crate) const DB_FILE: &str = "fintrack.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How many rows `recent` shows when no count is given.
    pub recent_count: usize,
    /// Prefix used when printing amounts.
    pub currency_symbol: String,
    pub extractor: ExtractorSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorSection {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recent_count: 5,
            currency_symbol: "$".to_string(),
            extractor: ExtractorSection::default(),
        }
    }
}

impl Default for ExtractorSection {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Environment variables win over the file.
    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|v| !v.is_empty()) {
            self.extractor.api_key = Some(key);
        }
        if let Some(model) = lookup("GEMINI_MODEL").filter(|v| !v.is_empty()) {
            self.extractor.model = model;
        }
        if let Some(url) = lookup("GEMINI_BASE_URL").filter(|v| !v.is_empty()) {
            self.extractor.base_url = url;
        }
    }
}

/// Where the database and config file live. `FINTRACK_DATA_DIR` overrides
/// the platform default.
pub(crate) fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var("FINTRACK_DATA_DIR") {
        Ok(d) if !d.is_empty() => PathBuf::from(d),
        _ => directories::ProjectDirs::from("com", "fintrack", "fintrack")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
            .data_dir()
            .to_path_buf(),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
    Ok(dir)
}

pub(crate) fn load_config(dir: &Path) -> Result<Config> {
    let mut config = read_config_file(&dir.join(CONFIG_FILE))?;
    config.apply_overrides(|k| std::env::var(k).ok());
    Ok(config)
}

pub(crate) fn read_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

/// Write a default config file unless one exists. Returns whether it wrote.
pub(crate) fn init_config(dir: &Path) -> Result<bool> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        return Ok(false);
    }
    let s = toml::to_string_pretty(&Config::default()).context("serialize config")?;
    fs::write(&path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(true)
}
